//! Legend code tables for the filterable layers and the trail style swatch

use crate::filter::compare_codes;
use crate::registry::FilterCategory;

/// RGBA color, components in 0..=255
pub type Rgba = [u8; 4];

const SOIL_COLORS: &[(&str, &str)] = &[
    ("01", "#c8824c"),
    ("02", "#c8ab4f"),
    ("03", "#c6c9b7"),
    ("05", "#efc27e"),
    ("06", "#19ee12"),
    ("28", "#7182d9"),
    ("82", "#d2533f"),
    ("91", "#62e0d6"),
    ("93", "#8ce7b5"),
    ("94", "#de386f"),
    ("95", "#80ee19"),
    ("99", "#128cd2"),
];

const SOIL_DESCRIPTIONS: &[(&str, &str)] = &[
    ("01", "갈색건조림토양(1)"),
    ("02", "갈색산림토양(2)"),
    ("03", "갈색산림토양(3)"),
    ("05", "암갈색산림토양"),
    ("06", "매우깊은갈색산림토양"),
    ("28", "식양질논토양"),
    ("82", "사질밭토양"),
    ("91", "회색토"),
    ("93", "신흥이탄토양"),
    ("94", "경작지"),
    ("95", "특이토양"),
    ("99", "하천부지"),
];

const IMSANGDO_COLORS: &[(&str, &str)] = &[
    ("0", "#e0447a"),
    ("1", "#56d014"),
    ("2", "#b370d7"),
    ("3", "#34ca96"),
    ("4", "#4e7bcf"),
];

const IMSANGDO_DESCRIPTIONS: &[(&str, &str)] = &[
    ("0", "무립목지 / 비산림"),
    ("1", "침엽수림"),
    ("2", "활엽수림"),
    ("3", "혼효림"),
    ("4", "죽림"),
];

/// Stroke color of the hiking trail lines
pub const HIKING_TRAIL_COLOR: &str = "#4a148c";
pub const HIKING_TRAIL_LABEL: &str = "등산로";

/// Used when a described code has no color entry
const FALLBACK_COLOR: Rgba = [0x80, 0x80, 0x80, 0xff];

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub code: &'static str,
    pub description: &'static str,
    pub color: Rgba,
}

type CodeTable = &'static [(&'static str, &'static str)];

fn tables(category: FilterCategory) -> (CodeTable, CodeTable) {
    match category {
        FilterCategory::Soil => (SOIL_COLORS, SOIL_DESCRIPTIONS),
        FilterCategory::Imsangdo => (IMSANGDO_COLORS, IMSANGDO_DESCRIPTIONS),
    }
}

fn lookup(table: &[(&'static str, &'static str)], code: &str) -> Option<&'static str> {
    table.iter().find(|(c, _)| *c == code).map(|(_, v)| *v)
}

pub fn color_of(category: FilterCategory, code: &str) -> Option<Rgba> {
    lookup(tables(category).0, code).and_then(parse_hex_color)
}

pub fn description_of(category: FilterCategory, code: &str) -> Option<&'static str> {
    lookup(tables(category).1, code)
}

/// Every code with a description, in code order
pub fn legend_entries(category: FilterCategory) -> Vec<LegendEntry> {
    let (colors, descriptions) = tables(category);
    let mut entries: Vec<LegendEntry> = descriptions
        .iter()
        .map(|&(code, description)| LegendEntry {
            code,
            description,
            color: lookup(colors, code)
                .and_then(parse_hex_color)
                .unwrap_or(FALLBACK_COLOR),
        })
        .collect();
    entries.sort_by(|a, b| compare_codes(a.code, b.code));
    entries
}

/// Parses `#rgb`, `#rrggbb` or `#rrggbbaa`
pub fn parse_hex_color(hex: &str) -> Option<Rgba> {
    let digits = hex.strip_prefix('#')?;
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();

    match digits.len() {
        3 => {
            let mut rgba = [0xff; 4];
            for (i, c) in digits.chars().enumerate() {
                let v = c.to_digit(16)? as u8;
                rgba[i] = v * 17;
            }
            Some(rgba)
        }
        6 | 8 => {
            let mut rgba = [0xff; 4];
            for i in 0..digits.len() / 2 {
                rgba[i] = channel(digits.get(i * 2..i * 2 + 2)?)?;
            }
            Some(rgba)
        }
        _ => None,
    }
}
