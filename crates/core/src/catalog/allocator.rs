use std::collections::{BTreeMap, BTreeSet};

use crate::domain::{Image, UNCATEGORIZED_CODE};
use crate::error::{Error, Result};

const MAX_CATEGORY_CODE: u32 = 99;
const MAX_IMAGE_SEQUENCE: u32 = 999;

/// Pick the lowest category code in `01..=99` that no category holds yet.
///
/// Gap-filling keeps codes collision-free even for catalogs written by older
/// builds that numbered categories from the map size.
pub fn next_category_code(categories: &BTreeMap<String, String>) -> Result<String> {
    let used: BTreeSet<&str> = categories.values().map(String::as_str).collect();
    (1..=MAX_CATEGORY_CODE)
        .map(|n| format!("{n:02}"))
        .find(|code| code != UNCATEGORIZED_CODE && !used.contains(code.as_str()))
        .ok_or(Error::CategoryCodesExhausted)
}

/// Pick the lowest free image ID inside `code`.
///
/// `skip` names an entry whose current ID must not count as taken (the image
/// being moved or overwritten).
pub fn next_image_id(
    images: &BTreeMap<String, Image>,
    code: &str,
    skip: Option<&str>,
) -> Result<String> {
    let taken: BTreeSet<u32> = images
        .iter()
        .filter(|(key, _)| Some(key.as_str()) != skip)
        .filter(|(_, image)| image.category == code)
        .filter_map(|(_, image)| sequence_of(&image.id, code))
        .collect();

    (1..=MAX_IMAGE_SEQUENCE)
        .find(|n| !taken.contains(n))
        .map(|n| format!("{code}{n:03}"))
        .ok_or_else(|| Error::ImageIdsExhausted(code.to_string()))
}

/// Numeric suffix of an ID within `code`; `None` for IDs that don't fit the scheme.
fn sequence_of(id: &str, code: &str) -> Option<u32> {
    let suffix = id.strip_prefix(code)?;
    if suffix.len() != 3 || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    suffix.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(name: &str, id: &str, category: &str) -> (String, Image) {
        (
            name.to_string(),
            Image {
                url: format!("https://img.example/{name}.png"),
                name: name.to_string(),
                id: id.to_string(),
                category: category.to_string(),
            },
        )
    }

    #[test]
    fn test_first_category_gets_01() {
        let categories = BTreeMap::new();
        assert_eq!(next_category_code(&categories).unwrap(), "01");
    }

    #[test]
    fn test_category_code_fills_gap() {
        let categories: BTreeMap<String, String> = [
            ("cats".to_string(), "01".to_string()),
            ("birds".to_string(), "03".to_string()),
        ]
        .into();
        assert_eq!(next_category_code(&categories).unwrap(), "02");
    }

    #[test]
    fn test_category_code_skips_reserved_null_entry() {
        // Older catalogs record the uncategorized bucket as a named category.
        let categories: BTreeMap<String, String> = [
            ("NULL".to_string(), "00".to_string()),
            ("cats".to_string(), "01".to_string()),
        ]
        .into();
        assert_eq!(next_category_code(&categories).unwrap(), "02");
    }

    #[test]
    fn test_category_codes_exhausted() {
        let categories: BTreeMap<String, String> =
            (1..=99).map(|n| (format!("c{n}"), format!("{n:02}"))).collect();
        let err = next_category_code(&categories).unwrap_err();
        assert!(matches!(err, Error::CategoryCodesExhausted));
    }

    #[test]
    fn test_first_image_id_in_category() {
        let images = BTreeMap::new();
        assert_eq!(next_image_id(&images, "00", None).unwrap(), "00001");
        assert_eq!(next_image_id(&images, "07", None).unwrap(), "07001");
    }

    #[test]
    fn test_image_id_fills_lowest_gap() {
        let images: BTreeMap<String, Image> = [
            image("a", "01001", "01"),
            image("c", "01003", "01"),
            image("d", "01004", "01"),
        ]
        .into();
        assert_eq!(next_image_id(&images, "01", None).unwrap(), "01002");
    }

    #[test]
    fn test_image_id_ignores_other_categories() {
        let images: BTreeMap<String, Image> =
            [image("a", "02001", "02"), image("b", "02002", "02")].into();
        assert_eq!(next_image_id(&images, "01", None).unwrap(), "01001");
    }

    #[test]
    fn test_image_id_skip_frees_own_slot() {
        let images: BTreeMap<String, Image> =
            [image("a", "01001", "01"), image("b", "01002", "01")].into();
        assert_eq!(next_image_id(&images, "01", Some("a")).unwrap(), "01001");
        assert_eq!(next_image_id(&images, "01", Some("zzz")).unwrap(), "01003");
    }

    #[test]
    fn test_malformed_ids_do_not_block_allocation() {
        let images: BTreeMap<String, Image> =
            [image("a", "garbage", "01"), image("b", "0100x", "01")].into();
        assert_eq!(next_image_id(&images, "01", None).unwrap(), "01001");
    }

    #[test]
    fn test_image_ids_exhausted() {
        let images: BTreeMap<String, Image> = (1..=999)
            .map(|n| image(&format!("img{n}"), &format!("05{n:03}"), "05"))
            .collect();
        let err = next_image_id(&images, "05", None).unwrap_err();
        assert!(matches!(err, Error::ImageIdsExhausted(code) if code == "05"));
    }
}
