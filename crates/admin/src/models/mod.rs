//! Domain models for the catalog.
//!
//! Each entity has three shapes:
//! - the persisted row (`Billboard`), serialized as camelCase JSON
//! - a lenient request body (`BillboardInput`) where every field is optional
//! - a validated draft (`BillboardDraft`) that the repository writes

pub mod billboard;
pub mod category;
pub mod color;
pub mod product;
pub mod size;
pub mod store;
pub mod subcategory;
pub mod validation;

pub use billboard::{Billboard, BillboardDraft, BillboardInput};
pub use category::{Category, CategoryDraft, CategoryInput, CategoryWithBillboard};
pub use color::{Color, ColorDraft, ColorInput};
pub use product::{Image, ImageInput, Product, ProductDraft, ProductInput, ProductWithRelations};
pub use size::{Size, SizeDraft, SizeInput};
pub use store::{Store, StoreDraft, StoreInput};
pub use subcategory::{Subcategory, SubcategoryDraft, SubcategoryInput};
pub use validation::{Validate, ValidationError};
