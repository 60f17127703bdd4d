/// Base URL of the local search/agent backend
pub const BACKEND_URL: &str = "http://localhost:8000";

/// Origin of the local web app that proxies the chat route
pub const APP_ORIGIN_URL: &str = "http://localhost:3000";

/// Which request/response exchange a submitter speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    /// Plain search: `{input, state}` to `/query`
    Search,
    /// Paper search through the remote agent: `{messages, max_results}`
    Papers,
    /// Chat through the proxied agent route: full role-tagged history
    Chat,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Search => "search",
            Variant::Papers => "papers",
            Variant::Chat => "chat",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "search" => Some(Variant::Search),
            "papers" => Some(Variant::Papers),
            "chat" => Some(Variant::Chat),
            _ => None,
        }
    }

    pub fn all() -> Vec<Variant> {
        vec![Variant::Search, Variant::Papers, Variant::Chat]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Variant::Search => "Search",
            Variant::Papers => "Papers (Agent)",
            Variant::Chat => "Chat (Agent)",
        }
    }

    /// Next variant in tab order, wrapping around
    pub fn next(&self) -> Self {
        match self {
            Variant::Search => Variant::Papers,
            Variant::Papers => Variant::Chat,
            Variant::Chat => Variant::Search,
        }
    }

    /// Request path, relative to [`Variant::base_url`]
    pub fn path(&self) -> &'static str {
        match self {
            Variant::Search => "/query",
            Variant::Papers => "/copilotkit_remote",
            Variant::Chat => "/api/copilotkit_remote",
        }
    }

    pub fn base_url(&self) -> &'static str {
        match self {
            Variant::Search | Variant::Papers => BACKEND_URL,
            Variant::Chat => APP_ORIGIN_URL,
        }
    }

    /// Text shown in place of results when the exchange fails
    pub fn failure_text(&self) -> &'static str {
        match self {
            Variant::Search | Variant::Papers => "An error occurred while fetching results.",
            Variant::Chat => "Error: Could not reach the server",
        }
    }

    /// Whether results accumulate across submissions
    pub fn keeps_history(&self) -> bool {
        matches!(self, Variant::Chat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_round_trips_names() {
        for variant in Variant::all() {
            assert_eq!(Variant::from_str(variant.as_str()), Some(variant));
        }
        assert_eq!(Variant::from_str("PAPERS"), Some(Variant::Papers));
        assert_eq!(Variant::from_str("graph"), None);
    }

    #[test]
    fn test_next_cycles_through_all() {
        let mut v = Variant::Search;
        let mut seen = Vec::new();
        for _ in 0..3 {
            seen.push(v);
            v = v.next();
        }
        assert_eq!(seen, Variant::all());
        assert_eq!(v, Variant::Search);
    }

    #[test]
    fn test_endpoints_are_fixed() {
        assert_eq!(
            format!("{}{}", Variant::Search.base_url(), Variant::Search.path()),
            "http://localhost:8000/query"
        );
        assert_eq!(
            format!("{}{}", Variant::Papers.base_url(), Variant::Papers.path()),
            "http://localhost:8000/copilotkit_remote"
        );
        assert_eq!(Variant::Chat.path(), "/api/copilotkit_remote");
    }
}
