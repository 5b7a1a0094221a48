use serde::Deserialize;

/// Search key: full-width ASCII folded to half-width, lowercased, with
/// whitespace and hyphens removed.
pub fn normalize_search(input: &str) -> String {
    input
        .chars()
        .map(|c| match c {
            '\u{FF01}'..='\u{FF5E}' => char::from_u32(c as u32 - 0xFEE0).unwrap_or(c),
            '\u{3000}' => ' ',
            _ => c,
        })
        .filter(|c| !c.is_whitespace() && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub name_kana: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default = "active_by_default")]
    pub is_active: bool,
}

fn active_by_default() -> bool {
    true
}

impl CustomerSummary {
    fn matches(&self, needle: &str) -> bool {
        [Some(self.name.as_str()), self.name_kana.as_deref(), self.phone.as_deref()]
            .into_iter()
            .flatten()
            .any(|field| normalize_search(field).contains(needle))
    }
}

/// Customer picker state: a loaded list narrowed by query and activity.
#[derive(Debug, Default)]
pub struct CustomerSearch {
    customers: Vec<CustomerSummary>,
    query: String,
    include_inactive: bool,
}

impl CustomerSearch {
    pub fn new(customers: Vec<CustomerSummary>) -> Self {
        Self {
            customers,
            ..Self::default()
        }
    }

    /// Build from a `GET /api/resources/customers` body; an unexpected shape
    /// yields an empty list.
    pub fn from_json(body: serde_json::Value) -> Self {
        match serde_json::from_value(body) {
            Ok(customers) => Self::new(customers),
            Err(e) => {
                tracing::warn!("Ignoring malformed customer list: {}", e);
                Self::default()
            }
        }
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn set_include_inactive(&mut self, include: bool) {
        self.include_inactive = include;
    }

    pub fn results(&self) -> Vec<&CustomerSummary> {
        let needle = normalize_search(&self.query);
        self.customers
            .iter()
            .filter(|c| self.include_inactive || c.is_active)
            .filter(|c| needle.is_empty() || c.matches(&needle))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn search() -> CustomerSearch {
        CustomerSearch::from_json(json!([
            {"id": "1", "name": "山田建設", "nameKana": "ヤマダケンセツ", "phone": "03-1111-2222"},
            {"id": "2", "name": "Tanaka Koumuten", "phone": "06-3333-4444"},
            {"id": "3", "name": "佐藤工業", "isActive": false},
        ]))
    }

    fn ids(results: Vec<&CustomerSummary>) -> Vec<&str> {
        results.into_iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn folds_width_case_and_separators() {
        assert_eq!(normalize_search("ＴＡＮＡＫＡ　Ｋｏｕ"), "tanakakou");
        assert_eq!(normalize_search("03-1111-2222"), "0311112222");
    }

    #[test]
    fn filters_by_query_and_activity() {
        let mut s = search();
        assert_eq!(ids(s.results()), vec!["1", "2"]);

        s.set_query("tanaka");
        assert_eq!(ids(s.results()), vec!["2"]);

        s.set_query("ヤマダ");
        assert_eq!(ids(s.results()), vec!["1"]);

        s.set_query("0311112222");
        assert_eq!(ids(s.results()), vec!["1"]);

        s.set_query("佐藤");
        assert!(s.results().is_empty());
        s.set_include_inactive(true);
        assert_eq!(ids(s.results()), vec!["3"]);
    }

    #[test]
    fn malformed_body_degrades_to_empty() {
        let s = CustomerSearch::from_json(json!({"error": "Unauthorized"}));
        assert!(s.results().is_empty());
    }
}
