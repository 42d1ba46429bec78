use crate::TaskInput;

/// Client and style settings shared by every line of a submitted batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSettings {
    pub client_id: String,
    pub client_name: String,
    pub language: String,
    pub tone: String,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_name: "General".to_string(),
            language: "th".to_string(),
            tone: "Professional".to_string(),
        }
    }
}

/// One task per non-blank line of the form `keyword | custom title`.
///
/// Only the first two `|`-separated segments are read; anything after a second `|` is ignored.
pub fn parse_batch(raw: &str, settings: &BatchSettings) -> Vec<TaskInput> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let mut parts = line.split('|');
            let keyword = parts.next().unwrap_or_default().trim();
            let custom_title = parts.next().map(str::trim);
            if keyword.is_empty() {
                return None;
            }
            Some(TaskInput {
                keyword: keyword.to_string(),
                custom_title: custom_title
                    .filter(|title| !title.is_empty())
                    .map(ToOwned::to_owned),
                client_name: settings.client_name.clone(),
                client_id: settings.client_id.clone(),
                language: settings.language.clone(),
                tone: settings.tone.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{parse_batch, BatchSettings};

    #[test]
    fn keyword_only_line_has_no_custom_title() {
        let tasks = parse_batch("seo tips", &BatchSettings::default());
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].keyword, "seo tips");
        assert_eq!(tasks[0].custom_title, None);
        assert_eq!(tasks[0].client_name, "General");
    }

    #[test]
    fn segments_after_the_title_are_ignored() {
        let tasks = parse_batch("coffee | Best | Beans", &BatchSettings::default());
        assert_eq!(tasks[0].keyword, "coffee");
        assert_eq!(tasks[0].custom_title.as_deref(), Some("Best"));
    }

    #[test]
    fn empty_title_and_keyword_are_dropped() {
        let tasks = parse_batch("coffee |  \n | orphan title\n", &BatchSettings::default());
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].custom_title, None);
    }
}
