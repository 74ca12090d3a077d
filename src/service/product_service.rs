use std::sync::Arc;

use async_trait::async_trait;
use bson::{oid::ObjectId, Document};
use tracing::{info, instrument};

use crate::dto::product_dto::{
    CreateProductRequest, ListProductsQuery, ProductListResponse, UpdateProductRequest,
};
use crate::model::product::Product;
use crate::model::user::Role;
use crate::repository::product_repo::{
    MongoProductRepository, ProductFilter, ProductRepository, ProductSort,
};
use crate::util::error::ServiceError;

const MAX_PAGE_SIZE: u64 = 60;

fn parse_flag(value: Option<&str>) -> Option<bool> {
    match value {
        Some("true") => Some(true),
        Some("false") => Some(false),
        _ => None,
    }
}

/// Translate the query string into a repository filter.
pub fn build_filter(query: &ListProductsQuery) -> ProductFilter {
    ProductFilter {
        q: query.q.clone().filter(|q| !q.is_empty()),
        category: query.category.clone().filter(|c| !c.is_empty()),
        published: parse_flag(query.published.as_deref()),
        discount_only: parse_flag(query.discount_only.as_deref()).unwrap_or(false),
        in_stock: parse_flag(query.in_stock.as_deref()).unwrap_or(false),
        min_price: query.min_price,
        max_price: query.max_price,
    }
}

#[async_trait]
pub trait ProductService: Send + Sync {
    async fn list(&self, query: ListProductsQuery) -> Result<ProductListResponse, ServiceError>;
    async fn get(&self, id: &str) -> Result<Product, ServiceError>;
    async fn create(
        &self,
        creator_id: &str,
        creator_role: Role,
        req: CreateProductRequest,
    ) -> Result<Product, ServiceError>;
    async fn update(&self, id: &str, req: UpdateProductRequest) -> Result<Product, ServiceError>;
    async fn delete(&self, id: &str) -> Result<(), ServiceError>;
    async fn publish(&self, id: &str) -> Result<Product, ServiceError>;
    async fn unpublish(&self, id: &str) -> Result<Product, ServiceError>;
    async fn decline(&self, id: &str) -> Result<Product, ServiceError>;
    async fn my_products(&self, creator_id: &str) -> Result<Vec<Product>, ServiceError>;
}

pub struct ProductServiceImpl {
    pub product_repo: Arc<MongoProductRepository>,
}

impl ProductServiceImpl {
    pub fn new(product_repo: Arc<MongoProductRepository>) -> Self {
        Self { product_repo }
    }
}

fn parse_oid(id: &str) -> Result<ObjectId, ServiceError> {
    ObjectId::parse_str(id).map_err(|_| ServiceError::InvalidInput(format!("Invalid id: {}", id)))
}

#[async_trait]
impl ProductService for ProductServiceImpl {
    #[instrument(skip(self, query))]
    async fn list(&self, query: ListProductsQuery) -> Result<ProductListResponse, ServiceError> {
        let filter = build_filter(&query);
        let sort = ProductSort::parse(query.sort.as_deref());

        // Pagination kicks in only when both page and pageSize are supplied;
        // otherwise the full result set comes back with total = len.
        if let (Some(page), Some(page_size)) = (query.page, query.page_size) {
            let page = page.max(1);
            let page_size = page_size.clamp(1, MAX_PAGE_SIZE);
            let products = self
                .product_repo
                .list(&filter, sort, Some((page, page_size)))
                .await?;
            let total = self.product_repo.count(&filter).await?;
            return Ok(ProductListResponse {
                products,
                total,
                page: Some(page),
                page_size: Some(page_size),
            });
        }

        let products = self.product_repo.list(&filter, sort, None).await?;
        let total = products.len() as u64;
        Ok(ProductListResponse {
            products,
            total,
            page: None,
            page_size: None,
        })
    }

    async fn get(&self, id: &str) -> Result<Product, ServiceError> {
        let id = parse_oid(id)?;
        Ok(self.product_repo.find_by_id(id).await?)
    }

    #[instrument(skip(self, req), fields(title = %req.title, role = %creator_role))]
    async fn create(
        &self,
        creator_id: &str,
        creator_role: Role,
        req: CreateProductRequest,
    ) -> Result<Product, ServiceError> {
        let creator = parse_oid(creator_id)?;
        // Admin uploads go live immediately; farmer submissions queue for
        // review.
        let (is_published, publish_requested) = match creator_role {
            Role::Admin => (req.is_published.unwrap_or(true), false),
            _ => (false, true),
        };
        let product = Product {
            id: None,
            title: req.title,
            description: req.description,
            images: req.images,
            price: req.price,
            discount_price: req.discount_price,
            stock: req.stock.unwrap_or(0),
            category: req.category,
            is_published,
            publish_requested,
            is_declined: false,
            created_by: Some(creator),
            created_at: None,
            updated_at: None,
        };
        let created = self.product_repo.insert(product).await?;
        info!("Product created");
        Ok(created)
    }

    async fn update(&self, id: &str, req: UpdateProductRequest) -> Result<Product, ServiceError> {
        let id = parse_oid(id)?;
        let mut set = Document::new();
        if let Some(title) = req.title {
            set.insert("title", title);
        }
        if let Some(description) = req.description {
            set.insert("description", description);
        }
        if let Some(images) = req.images {
            set.insert("images", images);
        }
        if let Some(price) = req.price {
            set.insert("price", price);
        }
        if let Some(discount_price) = req.discount_price {
            set.insert("discountPrice", discount_price);
        }
        if let Some(stock) = req.stock {
            set.insert("stock", stock);
        }
        if let Some(category) = req.category {
            set.insert("category", category.as_str());
        }
        if set.is_empty() {
            return Err(ServiceError::InvalidInput("Nothing to update".to_string()));
        }
        Ok(self.product_repo.update_fields(id, set).await?)
    }

    async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        let id = parse_oid(id)?;
        self.product_repo.delete(id).await?;
        Ok(())
    }

    async fn publish(&self, id: &str) -> Result<Product, ServiceError> {
        let id = parse_oid(id)?;
        let set = bson::doc! {
            "isPublished": true,
            "publishRequested": false,
            "isDeclined": false,
        };
        Ok(self.product_repo.update_fields(id, set).await?)
    }

    async fn unpublish(&self, id: &str) -> Result<Product, ServiceError> {
        let id = parse_oid(id)?;
        Ok(self
            .product_repo
            .update_fields(id, bson::doc! { "isPublished": false })
            .await?)
    }

    async fn decline(&self, id: &str) -> Result<Product, ServiceError> {
        let id = parse_oid(id)?;
        let set = bson::doc! {
            "isPublished": false,
            "publishRequested": false,
            "isDeclined": true,
        };
        Ok(self.product_repo.update_fields(id, set).await?)
    }

    async fn my_products(&self, creator_id: &str) -> Result<Vec<Product>, ServiceError> {
        let creator = parse_oid(creator_id)?;
        Ok(self.product_repo.list_by_creator(creator).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_query() -> ListProductsQuery {
        ListProductsQuery {
            q: None,
            category: None,
            min_price: None,
            max_price: None,
            discount_only: None,
            published: None,
            in_stock: None,
            page: None,
            page_size: None,
            sort: None,
        }
    }

    #[test]
    fn test_build_filter_ignores_empty_strings() {
        let mut query = base_query();
        query.q = Some("".to_string());
        query.category = Some("".to_string());
        let filter = build_filter(&query);
        assert!(filter.q.is_none());
        assert!(filter.category.is_none());
    }

    #[test]
    fn test_build_filter_parses_flags() {
        let mut query = base_query();
        query.in_stock = Some("true".to_string());
        query.discount_only = Some("yes".to_string());
        query.published = Some("false".to_string());
        let filter = build_filter(&query);
        assert!(filter.in_stock);
        assert!(!filter.discount_only);
        assert_eq!(filter.published, Some(false));
    }
}
