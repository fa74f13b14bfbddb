// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! A simulation entity.
//!
//! All parts of a model should contain an entity in order to maintain a
//! hierarchy of simulation entities. The entity is used when logging so that
//! each message names the component that emitted it.

use std::fmt;
use std::rc::Rc;

/// A simulation entity
///
/// An entity is a part of a hierarchical simulation in which it must have a
/// parent. The simulation top-level should be created using
/// `toplevel("name")`.
pub struct Entity {
    /// Name of this entity.
    pub name: String,

    /// Optional parent entity (only the top-level should be None).
    pub parent: Option<Rc<Entity>>,
}

static JOIN: &str = "::";

impl Entity {
    /// Create a new entity.
    #[must_use]
    pub fn new(parent: &Rc<Entity>, name: &str) -> Self {
        Self {
            name: String::from(name),
            parent: Some(parent.clone()),
        }
    }

    /// Returns the full hierarchical name of this entity
    #[must_use]
    pub fn full_name(&self) -> String {
        match &self.parent {
            Some(parent) => {
                let mut name = parent.full_name();
                name.push_str(JOIN);
                name.push_str(self.name.as_str());
                name
            }
            None => self.name.clone(),
        }
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("name", &self.name)
            .field("parent", &self.parent)
            .finish()
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(parent) = &self.parent {
            parent.fmt(f)?;
            write!(f, "{}{}", JOIN, self.name)
        } else {
            write!(f, "{}", self.name)
        }
    }
}

/// Create the top-level entity. This should be the only entity without a
/// parent.
#[must_use]
pub fn toplevel(name: &str) -> Rc<Entity> {
    Rc::new(Entity {
        parent: None,
        name: String::from(name),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_names_follow_the_hierarchy() {
        let top = toplevel("top");
        let child = Rc::new(Entity::new(&top, "child"));
        let leaf = Entity::new(&child, "leaf");
        assert_eq!(top.full_name(), "top");
        assert_eq!(child.full_name(), "top::child");
        assert_eq!(leaf.full_name(), "top::child::leaf");
        assert_eq!(format!("{leaf}"), "top::child::leaf");
    }
}
