//! Editable sections of the public site and the content keys each owns

use std::fmt;
use std::str::FromStr;

/// A group of content fields saved together from the dashboard
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Section {
    Hero,
    About,
    Contact,
    Resume,
    ProjectsBackground,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::Hero,
        Section::About,
        Section::Contact,
        Section::Resume,
        Section::ProjectsBackground,
    ];

    /// Content keys of this section, in save order
    pub fn keys(&self) -> &'static [&'static str] {
        match self {
            Section::Hero => &[
                "hero_title_line1",
                "hero_title_line2",
                "hero_title_line3",
                "hero_title_line4",
                "hero_description",
                "hero_tagline",
                "hero_image_url",
            ],
            Section::About => &["about_image_url", "about_text1", "about_text2", "about_text3"],
            Section::Contact => &[
                "telegram_url",
                "linkedin_url",
                "contact_text1",
                "contact_text2",
                "contact_text3",
                "contact_footer_image_url",
            ],
            Section::Resume => &["resume_url"],
            Section::ProjectsBackground => &["projects_bg_image_url"],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Section::Hero => "hero",
            Section::About => "about",
            Section::Contact => "contact",
            Section::Resume => "resume",
            Section::ProjectsBackground => "projects_background",
        }
    }

    /// Section owning `key`, if any
    pub fn of_key(key: &str) -> Option<Section> {
        Section::ALL
            .into_iter()
            .find(|section| section.keys().contains(&key))
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Section::ALL
            .into_iter()
            .find(|section| section.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown section '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_keys_are_unique_across_sections() {
        let mut seen = HashSet::new();
        for section in Section::ALL {
            for key in section.keys() {
                assert!(seen.insert(*key), "{} listed twice", key);
            }
        }
        assert_eq!(seen.len(), 19);
    }

    #[test]
    fn test_of_key() {
        assert_eq!(Section::of_key("hero_tagline"), Some(Section::Hero));
        assert_eq!(Section::of_key("resume_url"), Some(Section::Resume));
        assert_eq!(Section::of_key("unknown"), None);
    }

    #[test]
    fn test_parse_round_trips_name() {
        for section in Section::ALL {
            assert_eq!(section.to_string().parse::<Section>(), Ok(section));
        }
        assert!("footer".parse::<Section>().is_err());
    }
}
