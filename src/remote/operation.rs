//! Named remote operations.

use std::collections::BTreeMap;

pub const CONTEST_LIST: &str = "contest.list";
pub const USER_INFO: &str = "user.info";
pub const USER_STATUS: &str = "user.status";

/// One logical call against the remote API: a method name plus query
/// parameters. Parameters are kept sorted so addresses are reproducible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    name: String,
    params: BTreeMap<String, String>,
}

impl Operation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: BTreeMap::new(),
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(key.into(), value.to_string());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    /// `contest.list?gym=<gym>`
    pub fn contest_list(gym: bool) -> Self {
        Self::new(CONTEST_LIST).param("gym", gym)
    }

    /// `user.info?handles=a;b;c`
    pub fn user_info<S: AsRef<str>>(handles: &[S]) -> Self {
        let joined = handles
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(";");
        Self::new(USER_INFO).param("handles", joined)
    }

    /// `user.status?handle=<h>&from=<from>&count=<count>`
    pub fn user_status(handle: &str, from: u32, count: u32) -> Self {
        Self::new(USER_STATUS)
            .param("handle", handle)
            .param("from", from)
            .param("count", count)
    }
}
