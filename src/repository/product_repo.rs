use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document};
use futures::stream::TryStreamExt;
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument};
use mongodb::Database;
use tracing::info;

use crate::model::product::Product;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};

/// Catalog listing filter, built from query parameters.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub q: Option<String>,
    pub category: Option<String>,
    pub published: Option<bool>,
    pub discount_only: bool,
    pub in_stock: bool,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

impl ProductFilter {
    pub fn to_document(&self) -> Document {
        let mut filter = Document::new();
        if let Some(ref q) = self.q {
            filter.insert("title", doc! { "$regex": q, "$options": "i" });
        }
        if let Some(ref category) = self.category {
            filter.insert("category", category);
        }
        if let Some(published) = self.published {
            filter.insert("isPublished", published);
        }
        if self.discount_only {
            filter.insert("discountPrice", doc! { "$ne": null });
        }
        if self.in_stock {
            filter.insert("stock", doc! { "$gt": 0 });
        }
        let mut price = Document::new();
        if let Some(min) = self.min_price {
            price.insert("$gte", min);
        }
        if let Some(max) = self.max_price {
            price.insert("$lte", max);
        }
        if !price.is_empty() {
            filter.insert("price", price);
        }
        filter
    }
}

/// Fixed sort vocabulary for catalog listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProductSort {
    #[default]
    CreatedDesc,
    CreatedAsc,
    PriceAsc,
    PriceDesc,
}

impl ProductSort {
    /// Unknown values fall back to newest-first.
    pub fn parse(s: Option<&str>) -> ProductSort {
        match s {
            Some("created_asc") => ProductSort::CreatedAsc,
            Some("price_asc") => ProductSort::PriceAsc,
            Some("price_desc") => ProductSort::PriceDesc,
            _ => ProductSort::CreatedDesc,
        }
    }

    pub fn to_document(&self) -> Document {
        match self {
            ProductSort::CreatedDesc => doc! { "createdAt": -1 },
            ProductSort::CreatedAsc => doc! { "createdAt": 1 },
            ProductSort::PriceAsc => doc! { "price": 1 },
            ProductSort::PriceDesc => doc! { "price": -1 },
        }
    }
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn insert(&self, product: Product) -> RepositoryResult<Product>;
    async fn find_by_id(&self, id: ObjectId) -> RepositoryResult<Product>;
    async fn list(
        &self,
        filter: &ProductFilter,
        sort: ProductSort,
        page: Option<(u64, u64)>,
    ) -> RepositoryResult<Vec<Product>>;
    async fn count(&self, filter: &ProductFilter) -> RepositoryResult<u64>;
    async fn list_by_creator(&self, creator: ObjectId) -> RepositoryResult<Vec<Product>>;
    async fn update_fields(&self, id: ObjectId, set: Document) -> RepositoryResult<Product>;
    async fn delete(&self, id: ObjectId) -> RepositoryResult<()>;
}

pub struct MongoProductRepository {
    collection: mongodb::Collection<Product>,
}

impl MongoProductRepository {
    pub fn new(db: &Database) -> Self {
        MongoProductRepository {
            collection: db.collection::<Product>("products"),
        }
    }
}

fn now_rfc3339() -> String {
    chrono::Local::now().to_rfc3339()
}

#[async_trait]
impl ProductRepository for MongoProductRepository {
    async fn insert(&self, mut product: Product) -> RepositoryResult<Product> {
        product.id = Some(ObjectId::new());
        let now = now_rfc3339();
        product.created_at = Some(now.clone());
        product.updated_at = Some(now);
        self.collection.insert_one(product.clone(), None).await?;
        info!(title = %product.title, "Product created");
        Ok(product)
    }

    async fn find_by_id(&self, id: ObjectId) -> RepositoryResult<Product> {
        let product = self
            .collection
            .find_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| {
                RepositoryError::database(format!("Failed to fetch product by ID: {}", e))
            })?;
        product.ok_or_else(|| {
            RepositoryError::not_found(format!("Product not found for ID: {}", id))
        })
    }

    async fn list(
        &self,
        filter: &ProductFilter,
        sort: ProductSort,
        page: Option<(u64, u64)>,
    ) -> RepositoryResult<Vec<Product>> {
        let mut options = FindOptions::builder().sort(sort.to_document()).build();
        if let Some((page, page_size)) = page {
            options.skip = Some(crate::repository::page_skip(page, page_size));
            options.limit = Some(page_size as i64);
        }
        let cursor = self.collection.find(filter.to_document(), options).await?;
        let products = cursor.try_collect().await.map_err(|e| {
            RepositoryError::serialization(format!("Failed to deserialize products: {}", e))
        })?;
        Ok(products)
    }

    async fn count(&self, filter: &ProductFilter) -> RepositoryResult<u64> {
        let count = self
            .collection
            .count_documents(filter.to_document(), None)
            .await?;
        Ok(count)
    }

    async fn list_by_creator(&self, creator: ObjectId) -> RepositoryResult<Vec<Product>> {
        let options = FindOptions::builder().sort(doc! { "createdAt": -1 }).build();
        let cursor = self
            .collection
            .find(doc! { "createdBy": creator }, options)
            .await?;
        let products = cursor.try_collect().await.map_err(|e| {
            RepositoryError::serialization(format!("Failed to deserialize products: {}", e))
        })?;
        Ok(products)
    }

    async fn update_fields(&self, id: ObjectId, mut set: Document) -> RepositoryResult<Product> {
        set.insert("updatedAt", now_rfc3339());
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        let updated = self
            .collection
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": set }, options)
            .await?;
        updated.ok_or_else(|| {
            RepositoryError::not_found(format!("No product found to update for ID: {}", id))
        })
    }

    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        let result = self.collection.delete_one(doc! { "_id": id }, None).await?;
        if result.deleted_count == 0 {
            return Err(RepositoryError::not_found(format!(
                "No product found to delete for ID: {}",
                id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter_is_empty_document() {
        assert!(ProductFilter::default().to_document().is_empty());
    }

    #[test]
    fn test_filter_builds_price_range() {
        let filter = ProductFilter {
            min_price: Some(10.0),
            max_price: Some(50.0),
            ..Default::default()
        };
        let doc = filter.to_document();
        let price = doc.get_document("price").unwrap();
        assert_eq!(price.get_f64("$gte").unwrap(), 10.0);
        assert_eq!(price.get_f64("$lte").unwrap(), 50.0);
    }

    #[test]
    fn test_filter_flags() {
        let filter = ProductFilter {
            discount_only: true,
            in_stock: true,
            published: Some(true),
            ..Default::default()
        };
        let doc = filter.to_document();
        assert!(doc.contains_key("discountPrice"));
        assert!(doc.contains_key("stock"));
        assert_eq!(doc.get_bool("isPublished").unwrap(), true);
    }

    #[test]
    fn test_sort_parse_falls_back_to_newest() {
        assert_eq!(ProductSort::parse(None), ProductSort::CreatedDesc);
        assert_eq!(ProductSort::parse(Some("bogus")), ProductSort::CreatedDesc);
        assert_eq!(ProductSort::parse(Some("price_asc")), ProductSort::PriceAsc);
    }
}
