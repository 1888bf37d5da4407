use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopkeep_core::{CategoryId, DomainError, DomainResult, Entity, ShopId};

/// Form input for a new category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
}

/// Product category (row of the `categories` table).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub shop_id: ShopId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Category {
    pub fn create(
        id: CategoryId,
        shop_id: ShopId,
        form: NewCategory,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let name = form.name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("category name is required"));
        }

        Ok(Self {
            id,
            shop_id,
            name: name.to_string(),
            description: form
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            created_at: now,
        })
    }
}

impl Entity for Category {
    type Id = CategoryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_trims_fields() {
        let category = Category::create(
            CategoryId::new(),
            ShopId::new(),
            NewCategory {
                name: "  Phones ".to_string(),
                description: Some("   ".to_string()),
            },
            Utc::now(),
        )
        .unwrap();

        assert_eq!(category.name, "Phones");
        assert_eq!(category.description, None);
    }

    #[test]
    fn create_requires_a_name() {
        let err = Category::create(
            CategoryId::new(),
            ShopId::new(),
            NewCategory::default(),
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
