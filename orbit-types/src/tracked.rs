use crate::{catalog::CatalogId, elements::ElementSet};

/// An element set and the optional name it was published under
#[derive(Clone, PartialEq, Debug)]
pub struct TrackedObject {
    pub name: Option<String>,
    pub elements: ElementSet,
}

impl TrackedObject {
    pub fn new(name: Option<String>, elements: ElementSet) -> Self {
        Self { name, elements }
    }

    pub fn catalog_id(&self) -> CatalogId {
        self.elements.catalog_id()
    }

    /// The name, or `#<catalog id>` when the object is unnamed
    pub fn label(&self) -> String {
        match &self.name {
            Some(n) => n.clone(),
            None => format!("#{}", self.catalog_id()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::tests::iss_raw;

    #[test]
    fn labels() {
        let elements = ElementSet::try_from(iss_raw()).unwrap();
        let named = TrackedObject::new(Some("ISS (ZARYA)".to_owned()), elements.clone());
        assert_eq!(named.label(), "ISS (ZARYA)");
        let unnamed = TrackedObject::new(None, elements);
        assert_eq!(unnamed.label(), "#25544");
        assert_eq!(unnamed.catalog_id(), named.catalog_id());
    }
}
