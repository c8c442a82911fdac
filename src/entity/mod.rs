pub mod audit_logs;
pub mod blog_posts;
pub mod cart_items;
pub mod carts;
pub mod categories;
pub mod custom_order_images;
pub mod custom_orders;
pub mod faqs;
pub mod newsletter_subscribers;
pub mod portfolio_images;
pub mod product_images;
pub mod product_properties;
pub mod products;
pub mod properties;
pub mod settlements;
pub mod users;

pub use audit_logs::Entity as AuditLogs;
pub use blog_posts::Entity as BlogPosts;
pub use cart_items::Entity as CartItems;
pub use carts::Entity as Carts;
pub use categories::Entity as Categories;
pub use custom_order_images::Entity as CustomOrderImages;
pub use custom_orders::Entity as CustomOrders;
pub use faqs::Entity as Faqs;
pub use newsletter_subscribers::Entity as NewsletterSubscribers;
pub use portfolio_images::Entity as PortfolioImages;
pub use product_images::Entity as ProductImages;
pub use product_properties::Entity as ProductProperties;
pub use products::Entity as Products;
pub use properties::Entity as Properties;
pub use settlements::Entity as Settlements;
pub use users::Entity as Users;
