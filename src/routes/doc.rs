use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        cart::{CartItemView, CartView, RemovedFromCart},
        catalog::{CategoryList, PropertyList},
        checkout::{CheckoutSessionCreated, Deduction, SettlementOutcome, WebhookAck},
        content::{BlogPostList, FaqList, PortfolioList},
        custom_orders::{CustomOrderDetail, CustomOrderList},
        newsletter::NewsletterSendReport,
        products::{ProductDetail, ProductList},
    },
    models::{
        BlogPost, BlogTag, Category, ContactMethod, CustomOrder, CustomOrderImage,
        CustomOrderStatus, Faq, NewsletterSubscriber, PortfolioImage, Product, ProductImage,
        Property,
    },
    pricing::ShippingTier,
    response::{ApiResponse, Meta},
    routes::{
        admin, auth, cart, catalog, checkout, content, custom_orders, health, newsletter, params,
        products,
    },
    stock::StockShortfall,
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        health::home,
        auth::login,
        cart::get_cart,
        cart::add_item,
        cart::get_item,
        cart::update_item,
        cart::delete_item,
        cart::remove_from_cart,
        cart::clear_cart,
        checkout::create_session,
        checkout::checkout_success,
        checkout::gateway_webhook,
        custom_orders::create_custom_order,
        custom_orders::get_custom_order,
        custom_orders::list_custom_orders,
        custom_orders::update_custom_order,
        newsletter::subscribe,
        newsletter::unsubscribe,
        newsletter::send_newsletter,
        products::list_products,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        products::add_product_image,
        catalog::list_categories,
        catalog::list_properties,
        catalog::create_category,
        catalog::create_property,
        content::list_faqs,
        content::list_portfolio,
        content::list_posts,
        content::get_post,
        content::create_faq,
        content::create_post,
        content::update_post,
        content::delete_post,
        admin::list_low_stock,
        admin::adjust_inventory
    ),
    components(
        schemas(
            Product,
            ProductImage,
            Category,
            Property,
            CustomOrder,
            CustomOrderImage,
            CustomOrderStatus,
            ContactMethod,
            NewsletterSubscriber,
            Faq,
            PortfolioImage,
            BlogPost,
            BlogTag,
            CartView,
            CartItemView,
            RemovedFromCart,
            CheckoutSessionCreated,
            SettlementOutcome,
            Deduction,
            WebhookAck,
            StockShortfall,
            ShippingTier,
            CustomOrderDetail,
            CustomOrderList,
            NewsletterSendReport,
            ProductDetail,
            ProductList,
            CategoryList,
            PropertyList,
            FaqList,
            PortfolioList,
            BlogPostList,
            params::Pagination,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<CartView>,
            ApiResponse<SettlementOutcome>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Products", description = "Rug catalog"),
        (name = "Catalog", description = "Categories and properties"),
        (name = "Cart", description = "Session cart"),
        (name = "Checkout", description = "Hosted checkout and stock settlement"),
        (name = "Custom Orders", description = "Custom rug requests"),
        (name = "Newsletter", description = "Newsletter subscriptions"),
        (name = "Content", description = "FAQ, portfolio and blog"),
        (name = "Admin", description = "Admin endpoints"),
        (name = "Auth", description = "Authentication endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
