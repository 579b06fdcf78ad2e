//! Catalog operations: products, brands and categories.

use reqwest::Method;
use secrecy::SecretString;
use tracing::{debug, instrument};

use emporium_core::{
    Brand, BrandId, BrandInput, Category, CategoryId, CategoryInput, Page, Product, ProductId,
    ProductInput,
};

use super::{ApiClient, ApiError, CacheKey, CacheValue, Credentials, ProductQuery, segment};

/// Entity totals shown on the admin dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardCounts {
    pub products: u64,
    pub brands: u64,
    pub categories: u64,
    pub users: u64,
}

impl ApiClient {
    // =========================================================================
    // Products
    // =========================================================================

    /// List active products.
    ///
    /// Listings without search text are cached.
    #[instrument(skip(self), fields(page = query.page, search = ?query.search))]
    pub async fn list_products(&self, query: &ProductQuery) -> Result<Page<Product>, ApiError> {
        let key = CacheKey::Products(query.clone());
        if query.is_cacheable()
            && let Some(CacheValue::Products(page)) = self.cached(&key).await
        {
            return Ok(page);
        }

        let builder = self
            .request(Method::GET, "products", Credentials::Anonymous)?
            .query(&query.to_pairs());
        let page: Page<Product> = self.send(builder, "products").await?;

        if query.is_cacheable() {
            self.store(key, CacheValue::Products(page.clone())).await;
        }

        Ok(page)
    }

    /// List products including unpublished ones. Never cached.
    #[instrument(skip(self, token), fields(page = query.page))]
    pub async fn admin_products(
        &self,
        token: &SecretString,
        query: &ProductQuery,
    ) -> Result<Page<Product>, ApiError> {
        let query = ProductQuery {
            include_inactive: true,
            ..query.clone()
        };
        let builder = self
            .request(Method::GET, "products", Credentials::Bearer(token))?
            .query(&query.to_pairs());
        self.send(builder, "products").await
    }

    /// Get a product by ID.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: &ProductId) -> Result<Product, ApiError> {
        let key = CacheKey::Product(id.clone());
        if let Some(CacheValue::Product(product)) = self.cached(&key).await {
            return Ok(*product);
        }

        let path = format!("products/{}", segment(id.as_str()));
        let builder = self.request(Method::GET, &path, Credentials::Anonymous)?;
        let product: Product = self.send(builder, &format!("product {id}")).await?;

        self.store(key, CacheValue::Product(Box::new(product.clone())))
            .await;
        Ok(product)
    }

    #[instrument(skip(self, token, input), fields(name = %input.name))]
    pub async fn create_product(
        &self,
        token: &SecretString,
        input: &ProductInput,
    ) -> Result<Product, ApiError> {
        let builder = self
            .request(Method::POST, "products", Credentials::Bearer(token))?
            .json(input);
        let product: Product = self.send(builder, "product").await?;

        self.invalidate_product_listings();
        tracing::info!(product_id = %product.id, "Product created");
        Ok(product)
    }

    #[instrument(skip(self, token, input), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        token: &SecretString,
        id: &ProductId,
        input: &ProductInput,
    ) -> Result<Product, ApiError> {
        let path = format!("products/{}", segment(id.as_str()));
        let builder = self
            .request(Method::PUT, &path, Credentials::Bearer(token))?
            .json(input);
        let product: Product = self.send(builder, &format!("product {id}")).await?;

        self.invalidate_product(id).await;
        Ok(product)
    }

    #[instrument(skip(self, token), fields(product_id = %id))]
    pub async fn delete_product(&self, token: &SecretString, id: &ProductId) -> Result<(), ApiError> {
        let path = format!("products/{}", segment(id.as_str()));
        let builder = self.request(Method::DELETE, &path, Credentials::Bearer(token))?;
        self.send_empty(builder, &format!("product {id}")).await?;

        self.invalidate_product(id).await;
        tracing::info!("Product deleted");
        Ok(())
    }

    async fn invalidate_product(&self, id: &ProductId) {
        self.inner
            .catalog
            .invalidate(&CacheKey::Product(id.clone()))
            .await;
        self.invalidate_product_listings();
    }

    // =========================================================================
    // Brands
    // =========================================================================

    #[instrument(skip(self))]
    pub async fn list_brands(&self) -> Result<Vec<Brand>, ApiError> {
        if let Some(CacheValue::Brands(brands)) = self.cached(&CacheKey::Brands).await {
            return Ok(brands);
        }

        let builder = self.request(Method::GET, "brands", Credentials::Anonymous)?;
        let brands: Vec<Brand> = self.send(builder, "brands").await?;

        self.store(CacheKey::Brands, CacheValue::Brands(brands.clone()))
            .await;
        Ok(brands)
    }

    #[instrument(skip(self), fields(brand_id = %id))]
    pub async fn get_brand(&self, id: &BrandId) -> Result<Brand, ApiError> {
        let key = CacheKey::Brand(id.clone());
        if let Some(CacheValue::Brand(brand)) = self.cached(&key).await {
            return Ok(*brand);
        }

        let path = format!("brands/{}", segment(id.as_str()));
        let builder = self.request(Method::GET, &path, Credentials::Anonymous)?;
        let brand: Brand = self.send(builder, &format!("brand {id}")).await?;

        self.store(key, CacheValue::Brand(Box::new(brand.clone())))
            .await;
        Ok(brand)
    }

    #[instrument(skip(self, token, input), fields(name = %input.name))]
    pub async fn create_brand(
        &self,
        token: &SecretString,
        input: &BrandInput,
    ) -> Result<Brand, ApiError> {
        let builder = self
            .request(Method::POST, "brands", Credentials::Bearer(token))?
            .json(input);
        let brand: Brand = self.send(builder, "brand").await?;

        self.invalidate_brand(&brand.id).await;
        Ok(brand)
    }

    #[instrument(skip(self, token, input), fields(brand_id = %id))]
    pub async fn update_brand(
        &self,
        token: &SecretString,
        id: &BrandId,
        input: &BrandInput,
    ) -> Result<Brand, ApiError> {
        let path = format!("brands/{}", segment(id.as_str()));
        let builder = self
            .request(Method::PUT, &path, Credentials::Bearer(token))?
            .json(input);
        let brand: Brand = self.send(builder, &format!("brand {id}")).await?;

        self.invalidate_brand(id).await;
        Ok(brand)
    }

    #[instrument(skip(self, token), fields(brand_id = %id))]
    pub async fn delete_brand(&self, token: &SecretString, id: &BrandId) -> Result<(), ApiError> {
        let path = format!("brands/{}", segment(id.as_str()));
        let builder = self.request(Method::DELETE, &path, Credentials::Bearer(token))?;
        self.send_empty(builder, &format!("brand {id}")).await?;

        self.invalidate_brand(id).await;
        Ok(())
    }

    /// Products embed their brand, so listings go too.
    async fn invalidate_brand(&self, id: &BrandId) {
        let cache = &self.inner.catalog;
        cache.invalidate(&CacheKey::Brands).await;
        cache.invalidate(&CacheKey::Brand(id.clone())).await;
        self.invalidate_product_listings();
        debug!(brand_id = %id, "Brand cache invalidated");
    }

    // =========================================================================
    // Categories
    // =========================================================================

    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        if let Some(CacheValue::Categories(categories)) = self.cached(&CacheKey::Categories).await {
            return Ok(categories);
        }

        let builder = self.request(Method::GET, "categories", Credentials::Anonymous)?;
        let categories: Vec<Category> = self.send(builder, "categories").await?;

        self.store(
            CacheKey::Categories,
            CacheValue::Categories(categories.clone()),
        )
        .await;
        Ok(categories)
    }

    #[instrument(skip(self), fields(category_id = %id))]
    pub async fn get_category(&self, id: &CategoryId) -> Result<Category, ApiError> {
        let key = CacheKey::Category(id.clone());
        if let Some(CacheValue::Category(category)) = self.cached(&key).await {
            return Ok(*category);
        }

        let path = format!("categories/{}", segment(id.as_str()));
        let builder = self.request(Method::GET, &path, Credentials::Anonymous)?;
        let category: Category = self.send(builder, &format!("category {id}")).await?;

        self.store(key, CacheValue::Category(Box::new(category.clone())))
            .await;
        Ok(category)
    }

    #[instrument(skip(self, token, input), fields(name = %input.name))]
    pub async fn create_category(
        &self,
        token: &SecretString,
        input: &CategoryInput,
    ) -> Result<Category, ApiError> {
        let builder = self
            .request(Method::POST, "categories", Credentials::Bearer(token))?
            .json(input);
        let category: Category = self.send(builder, "category").await?;

        self.invalidate_category(&category.id).await;
        Ok(category)
    }

    #[instrument(skip(self, token, input), fields(category_id = %id))]
    pub async fn update_category(
        &self,
        token: &SecretString,
        id: &CategoryId,
        input: &CategoryInput,
    ) -> Result<Category, ApiError> {
        let path = format!("categories/{}", segment(id.as_str()));
        let builder = self
            .request(Method::PUT, &path, Credentials::Bearer(token))?
            .json(input);
        let category: Category = self.send(builder, &format!("category {id}")).await?;

        self.invalidate_category(id).await;
        Ok(category)
    }

    #[instrument(skip(self, token), fields(category_id = %id))]
    pub async fn delete_category(
        &self,
        token: &SecretString,
        id: &CategoryId,
    ) -> Result<(), ApiError> {
        let path = format!("categories/{}", segment(id.as_str()));
        let builder = self.request(Method::DELETE, &path, Credentials::Bearer(token))?;
        self.send_empty(builder, &format!("category {id}")).await?;

        self.invalidate_category(id).await;
        Ok(())
    }

    async fn invalidate_category(&self, id: &CategoryId) {
        let cache = &self.inner.catalog;
        cache.invalidate(&CacheKey::Categories).await;
        cache.invalidate(&CacheKey::Category(id.clone())).await;
        self.invalidate_product_listings();
        debug!(category_id = %id, "Category cache invalidated");
    }

    // =========================================================================
    // Dashboard
    // =========================================================================

    /// Count products, brands, categories and users concurrently.
    ///
    /// Totals come from `limit=1` list requests so only one row per entity is
    /// transferred.
    #[instrument(skip(self, token))]
    pub async fn dashboard_counts(&self, token: &SecretString) -> Result<DashboardCounts, ApiError> {
        let one = ProductQuery::first_page(1);
        let products = self.admin_products(token, &one);
        let users = self.list_users(token, 1, 1, None);
        let (products, brands, categories, users) =
            tokio::join!(products, self.list_brands(), self.list_categories(), users);

        Ok(DashboardCounts {
            products: products?.total,
            brands: brands?.len() as u64,
            categories: categories?.len() as u64,
            users: users?.total,
        })
    }
}
