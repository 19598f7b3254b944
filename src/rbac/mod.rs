pub mod authorizer;
pub mod bootstrap;
pub mod ids;
