//! Declared descriptor services

use crate::domain::Tags;
use serde::{Deserialize, Serialize};

/// One service declared in a multi-container descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    /// Service name, unique within its descriptor
    pub name: String,
    /// Identity derived from the image (tag stripped) or build spec
    pub image: String,
    /// Image or build reference as declared
    pub image_full: String,
    /// Names this service depends on; may include undeclared services
    pub depends_on: Vec<String>,
    /// Role tags, at most one per category
    #[serde(flatten)]
    pub tags: Tags,
}

impl Service {
    /// Start building a service
    pub fn builder(name: impl Into<String>) -> ServiceBuilder {
        ServiceBuilder::new(name)
    }

    /// Returns true if the service carries any infrastructure tag
    pub fn is_infrastructure(&self) -> bool {
        self.tags.has_infrastructure()
    }

    /// Returns the database tag, if any
    pub fn database(&self) -> Option<&str> {
        self.tags.dbs.iter().next().map(String::as_str)
    }
}

/// Builder for [`Service`]
#[derive(Debug, Clone)]
pub struct ServiceBuilder {
    name: String,
    image: String,
    image_full: String,
    depends_on: Vec<String>,
    tags: Tags,
}

impl ServiceBuilder {
    /// Create a builder for the named service
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: String::new(),
            image_full: String::new(),
            depends_on: Vec::new(),
            tags: Tags::new(),
        }
    }

    /// Set the identity and the declared reference it came from
    pub fn image(mut self, image: impl Into<String>, image_full: impl Into<String>) -> Self {
        self.image = image.into();
        self.image_full = image_full.into();
        self
    }

    /// Set the declared dependencies
    pub fn depends_on(mut self, depends_on: Vec<String>) -> Self {
        self.depends_on = depends_on;
        self
    }

    /// Set the role tags
    pub fn tags(mut self, tags: Tags) -> Self {
        self.tags = tags;
        self
    }

    /// Finish building
    pub fn build(self) -> Service {
        Service {
            name: self.name,
            image: self.image,
            image_full: self.image_full,
            depends_on: self.depends_on,
            tags: self.tags,
        }
    }
}
