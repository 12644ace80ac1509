//! Robots.txt rule evaluation backed by the robotstxt crate

use robotstxt::DefaultMatcher;

/// Rules from one robots.txt file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedRobots {
    /// No rules could be read; every URL is allowed
    AllowAll,

    /// Raw robots.txt body, evaluated on each check
    Rules(String),
}

impl ParsedRobots {
    /// Wraps a robots.txt body; a blank body allows everything
    pub fn from_content(content: &str) -> Self {
        if content.trim().is_empty() {
            Self::AllowAll
        } else {
            Self::Rules(content.to_string())
        }
    }

    /// The fail-open fallback used when robots.txt is unavailable
    pub fn allow_all() -> Self {
        Self::AllowAll
    }

    pub fn allows_everything(&self) -> bool {
        matches!(self, Self::AllowAll)
    }

    /// Checks whether `url` may be fetched by `user_agent`
    ///
    /// `url` may be absolute or a bare path. An agent of `*` matches only the
    /// global `User-agent: *` group.
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        match self {
            Self::AllowAll => true,
            Self::Rules(content) => {
                DefaultMatcher::default().one_agent_allowed_by_robots(content, user_agent, url)
            }
        }
    }

    /// Returns the `Crawl-delay` in seconds that applies to `user_agent`
    ///
    /// A group naming the agent wins over the `User-agent: *` group. Agent
    /// names match case-insensitively; unparsable values are ignored.
    pub fn crawl_delay(&self, user_agent: &str) -> Option<f64> {
        let content = match self {
            Self::AllowAll => return None,
            Self::Rules(content) => content,
        };

        let agent = user_agent.to_ascii_lowercase();
        let mut group: Vec<String> = Vec::new();
        let mut in_rules = false;
        let mut for_agent = None;
        let mut for_wildcard = None;

        for line in content.lines() {
            let line = line.split('#').next().unwrap_or("").trim();
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim();

            match key.trim().to_ascii_lowercase().as_str() {
                "user-agent" => {
                    // A user-agent line after rules opens a new group
                    if in_rules {
                        group.clear();
                        in_rules = false;
                    }
                    group.push(value.to_ascii_lowercase());
                }
                "crawl-delay" => {
                    in_rules = true;
                    let Ok(delay) = value.parse::<f64>() else {
                        continue;
                    };
                    if agent != "*" && group.iter().any(|name| *name == agent) {
                        for_agent.get_or_insert(delay);
                    } else if group.iter().any(|name| name == "*") {
                        for_wildcard.get_or_insert(delay);
                    }
                }
                _ => in_rules = true,
            }
        }

        for_agent.or(for_wildcard)
    }
}
