pub mod prelude;

pub mod companies;
