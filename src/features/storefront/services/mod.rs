pub mod reconciler;
pub mod storefront_service;

pub use reconciler::RealtimeReconciler;
pub use storefront_service::StorefrontService;
