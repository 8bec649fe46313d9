pub mod base;
pub mod categorical;
pub mod contact;
pub mod defaults;
pub mod name;
pub mod numeric;
pub mod year;

pub use base::NormalizerUtils;
pub use categorical::CategoricalNormalizer;
pub use contact::{EmailNormalizer, HiringNormalizer, PhoneNormalizer};
pub use defaults::DefaultsNormalizer;
pub use name::CompanyNameNormalizer;
pub use numeric::{ActivityCodeNormalizer, AmountNormalizer, CoordinateNormalizer, CountNormalizer};
pub use year::YearNormalizer;
