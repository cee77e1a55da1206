// Business domains
pub mod whitelist;
