pub mod storefront_dto;

pub use storefront_dto::{AppDetailDto, StorefrontAppDto, StorefrontCategoryDto, StorefrontQuery};
