/* Recover the firmware's memory layout from a GNU ld map file
 *
 * Only three kinds of line matter. They can appear anywhere in the map:
 *
 *   FLASH            0x08008000         0x000d8000         xr
 *   .name           0x080fb800      0x200
 *   .user           0x080fba00        0x0
 *
 * The first is the flash region in the memory configuration table (origin, length),
 * the second is the section reserved for the hub's name (start, size), and the third
 * is the section the user's program is stored in (start). Everything else is ignored.
 *
 * (c) Chris Williams, 2021.
 *
 * See LICENSE for usage and copying.
 */

use super::error::{Error, Result, StructuralField};
use wildmatch::WildMatch;

/* addresses and sizes found in a map, all of them required */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapLayout
{
    pub flash_origin: u64,
    pub flash_length: u64,
    pub name_start: u64,
    pub name_size: u64,
    pub user_start: u64
}

/* whatever has been recovered so far while scanning a map */
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MapScan
{
    flash_origin: Option<u64>,
    flash_length: Option<u64>,
    name_start: Option<u64>,
    name_size: Option<u64>,
    user_start: Option<u64>
}

/* a rule matches a line whose first token is the named section and which is followed
   by at least the given number of numeric tokens. apply() stores the values in the scan
   and returns false if the scan already had them, in which case nothing is changed */
pub struct Rule
{
    section: WildMatch,
    label: &'static str,
    values: usize,
    apply: fn(&mut MapScan, &[u64]) -> bool
}

/* the rules, in the order they're tried against each line */
pub fn rules() -> [Rule; 3]
{
    [
        Rule
        {
            section: WildMatch::new("FLASH"),
            label: "FLASH",
            values: 2,
            apply: |scan, v|
            {
                if scan.flash_origin.is_some() { return false; }
                scan.flash_origin = Some(v[0]);
                scan.flash_length = Some(v[1]);
                true
            }
        },
        Rule
        {
            section: WildMatch::new(".name"),
            label: ".name",
            values: 2,
            apply: |scan, v|
            {
                if scan.name_start.is_some() { return false; }
                scan.name_start = Some(v[0]);
                scan.name_size = Some(v[1]);
                true
            }
        },
        Rule
        {
            section: WildMatch::new(".user"),
            label: ".user",
            values: 1,
            apply: |scan, v|
            {
                if scan.user_start.is_some() { return false; }
                scan.user_start = Some(v[0]);
                true
            }
        }
    ]
}

impl MapScan
{
    pub fn new() -> MapScan { MapScan::default() }

    /* run one line past the rules. the first occurrence of each section wins */
    pub fn feed(&mut self, rules: &[Rule], line: &str)
    {
        /* section headers start in the first column. indented lines are input sections */
        if line.starts_with(char::is_whitespace)
        {
            return;
        }

        let mut tokens = line.split_whitespace();
        let first = match tokens.next()
        {
            Some(t) => t,
            None => return
        };

        for rule in rules.iter()
        {
            if rule.section.matches(first) == false
            {
                continue;
            }

            let values: Option<Vec<u64>> = tokens.clone().take(rule.values).map(parse_number).collect();
            match values
            {
                Some(v) if v.len() == rule.values =>
                {
                    if (rule.apply)(self, &v)
                    {
                        log::debug!("{}: {}", rule.label, format_values(&v));
                    }
                    else
                    {
                        log::warn!("Ignoring repeated {} line in map: {}", rule.label, line.trim_end());
                    }
                    return;
                },
                _ => ()
            }
        }
    }

    /* check every required fact was found, reporting the first missing one */
    pub fn into_layout(self) -> Result<MapLayout>
    {
        let flash_origin = self.flash_origin.ok_or(Error::MissingStructuralField(StructuralField::FlashOrigin))?;
        let flash_length = self.flash_length.ok_or(Error::MissingStructuralField(StructuralField::FlashLength))?;
        let name_start = self.name_start.ok_or(Error::MissingStructuralField(StructuralField::NameStart))?;
        let name_size = self.name_size.ok_or(Error::MissingStructuralField(StructuralField::NameStart))?;
        let user_start = self.user_start.ok_or(Error::MissingStructuralField(StructuralField::UserStart))?;

        Ok(MapLayout { flash_origin, flash_length, name_start, name_size, user_start })
    }

    /* list every required fact that hasn't been found yet */
    pub fn missing(&self) -> Vec<StructuralField>
    {
        let mut missing = Vec::new();
        if self.flash_origin.is_none() { missing.push(StructuralField::FlashOrigin) }
        if self.flash_length.is_none() { missing.push(StructuralField::FlashLength) }
        if self.name_start.is_none() || self.name_size.is_none() { missing.push(StructuralField::NameStart) }
        if self.user_start.is_none() { missing.push(StructuralField::UserStart) }
        missing
    }
}

/* scan the whole map in one pass and return the layout it describes */
pub fn parse(map: &str) -> Result<MapLayout>
{
    let rules = rules();
    let mut scan = MapScan::new();

    for line in map.lines()
    {
        scan.feed(&rules, line);
    }

    for field in scan.missing().iter()
    {
        log::debug!("map is missing {}", field);
    }

    scan.into_layout()
}

/* numbers in a map are hex, with or without a 0x prefix */
fn parse_number(token: &str) -> Option<u64>
{
    let digits = match token.strip_prefix("0x").or_else(|| token.strip_prefix("0X"))
    {
        Some(d) => d,
        None => token
    };

    if digits.is_empty() || digits.chars().all(|c| c.is_ascii_hexdigit()) == false
    {
        return None;
    }

    u64::from_str_radix(digits, 16).ok()
}

fn format_values(values: &[u64]) -> String
{
    values.iter().map(|v| format!("0x{:08x}", v)).collect::<Vec<String>>().join(" ")
}

#[cfg(test)]
mod tests
{
    use super::*;

    const FLASH_LINE: &str = "FLASH 0x08008000 0x000D8000";
    const NAME_LINE: &str = ".name 0x080FB800 0x200";
    const USER_LINE: &str = ".user 0x080FBA00";

    /* a cut-down but realistic GNU ld map */
    const GNU_LD_MAP: &str = "\
Archive member included to satisfy reference by file (symbol)

Memory Configuration

Name             Origin             Length             Attributes
FLASH_BOOTLOADER 0x0000000008000000 0x0000000000008000 xr
FLASH            0x0000000008008000 0x00000000000d8000 xr
RAM              0x0000000020000000 0x0000000000040000 xrw
*default*        0x0000000000000000 0xffffffffffffffff

Linker script and memory map

.isr_vector     0x0000000008008000      0x1ac
 *(.isr_vector)
 .isr_vector    0x0000000008008000      0x1ac build/startup.o

.name           0x00000000080fb800      0x200
 .name          0x00000000080fb800      0x100 build/main.o

.user           0x00000000080fba00        0x0
                0x00000000080fba00                _pb_user_mpy_size = .
";

    fn map_of(lines: &[&str]) -> String
    {
        lines.join("\n")
    }

    #[test]
    fn minimal_map()
    {
        let layout = parse(&map_of(&[FLASH_LINE, NAME_LINE, USER_LINE])).unwrap();
        assert_eq!(layout, MapLayout
        {
            flash_origin: 0x08008000,
            flash_length: 0x000D8000,
            name_start: 0x080FB800,
            name_size: 0x200,
            user_start: 0x080FBA00
        });
    }

    #[test]
    fn gnu_ld_map()
    {
        let layout = parse(GNU_LD_MAP).unwrap();
        assert_eq!(layout.flash_origin, 0x08008000);
        assert_eq!(layout.flash_length, 0xd8000);
        assert_eq!(layout.name_start, 0x080fb800);
        assert_eq!(layout.name_size, 0x200);
        assert_eq!(layout.user_start, 0x080fba00);
    }

    #[test]
    fn line_order_does_not_matter()
    {
        let forward = parse(&map_of(&[FLASH_LINE, NAME_LINE, USER_LINE])).unwrap();
        let backward = parse(&map_of(&[USER_LINE, NAME_LINE, FLASH_LINE])).unwrap();
        assert_eq!(forward, backward);
    }

    #[test]
    fn first_match_wins()
    {
        let map = map_of(&[
            FLASH_LINE,
            NAME_LINE,
            USER_LINE,
            "FLASH 0x10000000 0x00001000",
            ".name 0x10000800 0x40",
            ".user 0x10000a00",
        ]);
        assert_eq!(parse(&map).unwrap(), parse(&map_of(&[FLASH_LINE, NAME_LINE, USER_LINE])).unwrap());
    }

    #[test]
    fn each_missing_line_is_reported_on_its_own()
    {
        let cases =
        [
            (vec![NAME_LINE, USER_LINE], StructuralField::FlashOrigin),
            (vec![FLASH_LINE, USER_LINE], StructuralField::NameStart),
            (vec![FLASH_LINE, NAME_LINE], StructuralField::UserStart)
        ];

        for (lines, field) in cases.iter()
        {
            let rules = rules();
            let mut scan = MapScan::new();
            for line in lines.iter()
            {
                scan.feed(&rules, line);
            }

            /* the other facts are still recovered */
            let missing = scan.missing();
            assert_eq!(missing.len(), 1 + (*field == StructuralField::FlashOrigin) as usize);
            assert_eq!(missing[0], *field);

            match scan.into_layout()
            {
                Err(Error::MissingStructuralField(f)) => assert_eq!(f, *field),
                other => panic!("expected {:?} to be missing, got {:?}", field, other)
            }
        }
    }

    #[test]
    fn missing_flash_length_is_reported()
    {
        let scan = MapScan { flash_origin: Some(0x08008000), ..MapScan::default() };
        assert_eq!(scan.missing()[0], StructuralField::FlashLength);
    }

    #[test]
    fn empty_map_reports_flash_first()
    {
        match parse("")
        {
            Err(Error::MissingStructuralField(StructuralField::FlashOrigin)) => (),
            other => panic!("unexpected {:?}", other)
        }
    }

    #[test]
    fn name_without_size_does_not_match()
    {
        match parse(&map_of(&[FLASH_LINE, ".name 0x080FB800", USER_LINE]))
        {
            Err(Error::MissingStructuralField(StructuralField::NameStart)) => (),
            other => panic!("unexpected {:?}", other)
        }
    }

    #[test]
    fn similar_names_and_indented_lines_are_ignored()
    {
        let map = map_of(&[
            "FLASH_BOOTLOADER 0x08000000 0x00008000",
            " FLASH 0x00000000 0x00000000",
            ".names 0x00000000 0x10",
            " .name 0x00000000 0x10",
            ".user_data 0x00000000",
            FLASH_LINE,
            NAME_LINE,
            USER_LINE,
        ]);
        assert_eq!(parse(&map).unwrap(), parse(&map_of(&[FLASH_LINE, NAME_LINE, USER_LINE])).unwrap());
    }

    #[test]
    fn malformed_numbers_do_not_match()
    {
        let map = map_of(&["FLASH 0x0800g000 0x000D8000", ".name 0x 0x200", ".user +80FBA00", FLASH_LINE, NAME_LINE, USER_LINE]);
        assert_eq!(parse(&map).unwrap().flash_origin, 0x08008000);
        assert_eq!(parse(&map).unwrap().name_start, 0x080FB800);
        assert_eq!(parse(&map).unwrap().user_start, 0x080FBA00);
    }

    #[test]
    fn numbers_with_and_without_prefix()
    {
        assert_eq!(parse_number("0x080FB800"), Some(0x080FB800));
        assert_eq!(parse_number("0X200"), Some(0x200));
        assert_eq!(parse_number("080fb800"), Some(0x080FB800));
        assert_eq!(parse_number("0xffffffffffffffff"), Some(u64::MAX));
        assert_eq!(parse_number("0x1ffffffffffffffff"), None);
        assert_eq!(parse_number("xr"), None);
        assert_eq!(parse_number("0x"), None);
        assert_eq!(parse_number(""), None);
    }
}
