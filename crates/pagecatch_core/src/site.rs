/// One watched page as configured.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SiteDescriptor {
    pub name: String,
    pub url: String,
    /// Selector narrowing the page to the region that is compared.
    pub locator: Option<String>,
    /// Client identity that worked on the previous run.
    pub user_agent: Option<String>,
}

impl SiteDescriptor {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_locator(mut self, locator: impl Into<String>) -> Self {
        self.locator = Some(locator.into());
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Key grouping this site's snapshot history: `url` followed by the locator.
    pub fn identity(&self) -> String {
        format!("{}{}", self.url, self.locator.as_deref().unwrap_or(""))
    }

    /// Locator with surrounding whitespace removed, `None` when blank.
    pub fn effective_locator(&self) -> Option<&str> {
        self.locator
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
    }

    pub fn preferred_user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref().filter(|ua| !ua.is_empty())
    }
}

/// Order in which client identities are tried: the preferred one first, then
/// the pool in configured order, without duplicates or blanks.
pub fn trial_order(pool: &[String], preferred: Option<&str>) -> Vec<String> {
    let mut order: Vec<String> = Vec::with_capacity(pool.len() + 1);
    let candidates = preferred.into_iter().chain(pool.iter().map(String::as_str));
    for agent in candidates {
        if agent.is_empty() || order.iter().any(|seen| seen == agent) {
            continue;
        }
        order.push(agent.to_string());
    }
    order
}

#[cfg(test)]
mod tests {
    use super::{trial_order, SiteDescriptor};

    fn pool(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn preferred_identity_moves_to_front() {
        let order = trial_order(&pool(&["A", "B", "C"]), Some("B"));
        assert_eq!(order, pool(&["B", "A", "C"]));
    }

    #[test]
    fn unknown_preferred_identity_is_inserted() {
        let order = trial_order(&pool(&["A", "B"]), Some("Z"));
        assert_eq!(order, pool(&["Z", "A", "B"]));
    }

    #[test]
    fn duplicates_and_blanks_are_dropped() {
        let order = trial_order(&pool(&["A", "", "A", "B"]), Some(""));
        assert_eq!(order, pool(&["A", "B"]));
    }

    #[test]
    fn identity_concatenates_url_and_locator() {
        let site = SiteDescriptor::new("n", "https://a.example/x").with_locator("div#main");
        assert_eq!(site.identity(), "https://a.example/xdiv#main");
        assert_eq!(SiteDescriptor::new("n", "https://a.example/x").identity(), "https://a.example/x");
    }

    #[test]
    fn blank_locator_is_not_effective() {
        let site = SiteDescriptor::new("n", "u").with_locator("   ");
        assert_eq!(site.effective_locator(), None);
        assert_eq!(site.with_user_agent("").preferred_user_agent(), None);
    }
}
