#![forbid(unsafe_code)]

//! The portfolio site's section catalog.
//!
//! Ids are language independent; only the labels change with [`Lang`].

use crate::locale::Lang;
use crate::section::{Section, SectionSequence};

/// Section ids of the portfolio page, in display order.
pub const PORTFOLIO_SECTION_IDS: [&str; 6] =
    ["hero", "about", "skills", "portfolio", "references", "contact"];

const LABELS_DE: [&str; 6] = [
    "Start",
    "Über mich",
    "Fähigkeiten",
    "Portfolio",
    "Referenzen",
    "Kontakt",
];
const LABELS_EN: [&str; 6] = [
    "Home",
    "About Me",
    "Skillset",
    "Portfolio",
    "References",
    "Contact",
];
const LABELS_RU: [&str; 6] = [
    "Главная",
    "Обо мне",
    "Навыки",
    "Портфолио",
    "Рекомендации",
    "Контакт",
];

fn labels(lang: Lang) -> &'static [&'static str; 6] {
    match lang {
        Lang::De => &LABELS_DE,
        Lang::En => &LABELS_EN,
        Lang::Ru => &LABELS_RU,
    }
}

/// The six portfolio sections labelled for `lang`.
#[must_use]
pub fn portfolio_sections(lang: Lang) -> SectionSequence {
    let sections = PORTFOLIO_SECTION_IDS
        .iter()
        .zip(labels(lang))
        .map(|(id, label)| Section::new(*id, *label))
        .collect();
    match SectionSequence::new(sections) {
        Ok(seq) => seq,
        // The catalog is a fixed, non-empty list of distinct ids.
        Err(err) => unreachable!("portfolio catalog is invalid: {err}"),
    }
}

/// Swap the labels of a catalog-backed sequence to `lang`.
///
/// Sections that are not in the catalog keep their labels.
pub fn relabel(sections: &mut SectionSequence, lang: Lang) {
    sections.relabel_from(&portfolio_sections(lang));
}

/// Label of `id` in `lang`, if `id` is a portfolio section.
#[must_use]
pub fn label(lang: Lang, id: &str) -> Option<&'static str> {
    PORTFOLIO_SECTION_IDS
        .iter()
        .position(|candidate| *candidate == id)
        .map(|idx| labels(lang)[idx])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_stable_across_languages() {
        for lang in Lang::ALL {
            let seq = portfolio_sections(lang);
            let ids: Vec<&str> = seq.ids().map(|id| id.as_str()).collect();
            assert_eq!(ids, PORTFOLIO_SECTION_IDS.to_vec(), "{lang}");
        }
    }

    #[test]
    fn hero_is_default_and_contact_is_last() {
        let seq = portfolio_sections(Lang::De);
        assert_eq!(seq.first().id, "hero");
        assert!(seq.is_last("contact"));
    }

    #[test]
    fn labels_follow_language() {
        assert_eq!(label(Lang::De, "about"), Some("Über mich"));
        assert_eq!(label(Lang::En, "skills"), Some("Skillset"));
        assert_eq!(label(Lang::Ru, "contact"), Some("Контакт"));
        assert_eq!(label(Lang::En, "legal"), None);
    }

    #[test]
    fn relabel_swaps_language_in_place() {
        let mut seq = portfolio_sections(Lang::De);
        relabel(&mut seq, Lang::En);
        assert_eq!(seq.get(1).map(|s| s.label.as_str()), Some("About Me"));
        assert_eq!(seq.first().id, "hero");
    }
}
