use std::collections::HashMap;

use crate::config::{ConfigError, ConfigResult, DuplicatePolicy};

/// Media identities supplied at mount, unique and immutable.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ItemCollection {
    identities: Vec<String>,
}

impl ItemCollection {
    pub fn new<I, S>(items: I, policy: DuplicatePolicy) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut identities = Vec::new();
        let mut first_seen: HashMap<String, usize> = HashMap::new();
        for (position, item) in items.into_iter().enumerate() {
            let identity = item.into();
            if let Some(&first) = first_seen.get(&identity) {
                match policy {
                    DuplicatePolicy::Reject => {
                        return Err(ConfigError::DuplicateIdentity {
                            identity,
                            first,
                            second: position,
                        });
                    }
                    DuplicatePolicy::Deduplicate => {
                        tracing::warn!(%identity, first, position, "dropping duplicate identity");
                        continue;
                    }
                }
            }
            first_seen.insert(identity.clone(), position);
            identities.push(identity);
        }
        Ok(Self { identities })
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.identities.get(index).map(String::as_str)
    }

    pub fn position(&self, identity: &str) -> Option<usize> {
        self.identities.iter().position(|item| item == identity)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.identities.iter().map(String::as_str)
    }

    /// Items shown when opening from `source_identity`.
    pub fn carousel_for(&self, source_identity: &str) -> Carousel {
        if self.identities.len() > 1 {
            Carousel {
                identities: self.identities.clone(),
                mode: CarouselMode::Paged,
            }
        } else {
            Carousel {
                identities: vec![source_identity.to_string()],
                mode: CarouselMode::Single,
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarouselMode {
    /// Several pages; items drag on the vertical axis only.
    Paged,
    /// Only the source item; it drags freely.
    Single,
}

/// The ordered pages of one open cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Carousel {
    identities: Vec<String>,
    mode: CarouselMode,
}

impl Carousel {
    pub fn mode(&self) -> CarouselMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.identities.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.identities.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicates_are_rejected_by_default_policy() {
        let err = ItemCollection::new(["a", "b", "a"], DuplicatePolicy::Reject)
            .expect_err("duplicate should be rejected");
        assert_eq!(
            err,
            ConfigError::DuplicateIdentity {
                identity: "a".to_string(),
                first: 0,
                second: 2,
            }
        );
    }

    #[test]
    fn deduplicate_policy_keeps_first_occurrence() {
        let items = ItemCollection::new(["a", "b", "a", "c", "b"], DuplicatePolicy::Deduplicate)
            .expect("deduplicate should succeed");
        assert_eq!(items.iter().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(items.position("c"), Some(2));
    }

    #[test]
    fn small_collections_degenerate_to_the_source_item() {
        let empty = ItemCollection::default();
        let carousel = empty.carousel_for("photo.jpg");
        assert_eq!(carousel.mode(), CarouselMode::Single);
        assert_eq!(carousel.iter().collect::<Vec<_>>(), vec!["photo.jpg"]);

        let one = ItemCollection::new(["other.jpg"], DuplicatePolicy::Reject)
            .expect("single item should be accepted");
        assert_eq!(one.carousel_for("photo.jpg").get(0), Some("photo.jpg"));
    }

    #[test]
    fn larger_collections_page_through_every_item() {
        let items = ItemCollection::new(["a", "b", "c"], DuplicatePolicy::Reject)
            .expect("unique items should be accepted");
        let carousel = items.carousel_for("b");
        assert_eq!(carousel.mode(), CarouselMode::Paged);
        assert_eq!(carousel.len(), 3);
        assert_eq!(carousel.get(2), Some("c"));
    }
}
