use crate::core::client::{Client, ClientForm};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Created,
    Updated,
}

/// The in-memory client collection, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directory {
    clients: Vec<Client>,
}

impl Directory {
    pub fn new(clients: Vec<Client>) -> Self {
        Self { clients }
    }

    pub fn clients(&self) -> &[Client] {
        &self.clients
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Case-insensitive exact match on the code.
    pub fn find_by_code(&self, code: &str) -> Option<&Client> {
        self.clients.iter().find(|c| c.has_code(code))
    }

    pub fn find_by_code_mut(&mut self, code: &str) -> Option<&mut Client> {
        self.clients.iter_mut().find(|c| c.has_code(code))
    }

    /// Case-insensitive substring match on the display name.
    pub fn find_by_name_substring(&self, query: &str) -> Option<&Client> {
        let q = query.to_lowercase();
        self.clients
            .iter()
            .find(|c| c.name.to_lowercase().contains(&q))
    }

    /// An exact code match always wins over a name match.
    pub fn search(&self, query: &str) -> Option<&Client> {
        let q = query.trim().to_lowercase();
        if q.is_empty() {
            return None;
        }
        self.find_by_code(&q)
            .or_else(|| self.find_by_name_substring(&q))
    }

    /// Update the record with exactly this code, or append a new one. A code
    /// that differs from an existing one only by case is a duplicate.
    pub fn upsert(&mut self, form: &ClientForm) -> Result<SaveOutcome> {
        let code = form.code.trim();
        if let Some(existing) = self.clients.iter_mut().find(|c| c.code == code) {
            existing.merge_form(form);
            return Ok(SaveOutcome::Updated);
        }
        if self.find_by_code(code).is_some() {
            return Err(Error::DuplicateCode(code.to_string()));
        }
        self.clients.push(Client::from(form));
        Ok(SaveOutcome::Created)
    }

    /// Remove the record with this code, returning it if present.
    pub fn remove(&mut self, code: &str) -> Option<Client> {
        let pos = self.clients.iter().position(|c| c.has_code(code))?;
        Some(self.clients.remove(pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> Directory {
        Directory::new(vec![Client::new("A1", "Zed"), Client::new("Z9", "A1 Corp")])
    }

    #[test]
    fn search_prefers_code_over_name() {
        let dir = directory();
        assert_eq!(dir.search("a1").map(|c| c.code.as_str()), Some("A1"));
        assert_eq!(dir.search("  A1 ").map(|c| c.code.as_str()), Some("A1"));
    }

    #[test]
    fn search_falls_back_to_name() {
        let dir = directory();
        assert_eq!(dir.search("corp").map(|c| c.code.as_str()), Some("Z9"));
        assert_eq!(dir.search("ze").map(|c| c.code.as_str()), Some("A1"));
        assert!(dir.search("nobody").is_none());
    }

    #[test]
    fn empty_query_finds_nothing() {
        assert!(directory().search("   ").is_none());
        assert!(directory().search("").is_none());
    }

    #[test]
    fn repeated_save_keeps_one_record() {
        let mut dir = Directory::default();
        let form = ClientForm::new("A1", "Acme").field("email", "a@acme.test");
        assert_eq!(dir.upsert(&form).unwrap(), SaveOutcome::Created);

        let form = form.field("email", "b@acme.test");
        assert_eq!(dir.upsert(&form).unwrap(), SaveOutcome::Updated);

        assert_eq!(dir.len(), 1);
        assert_eq!(dir.clients()[0].fields["email"], "b@acme.test");
    }

    #[test]
    fn colliding_code_is_rejected() {
        let mut dir = directory();
        let before = dir.clone();
        let result = dir.upsert(&ClientForm::new("a1", "Impostor"));
        assert!(matches!(result, Err(Error::DuplicateCode(code)) if code == "a1"));
        assert_eq!(dir, before);
    }

    #[test]
    fn remove_by_code() {
        let mut dir = directory();
        assert_eq!(dir.remove("z9").map(|c| c.name), Some("A1 Corp".to_string()));
        assert_eq!(dir.len(), 1);
        assert!(dir.remove("z9").is_none());
    }
}
