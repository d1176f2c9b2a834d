mod convert;
mod descriptor;

pub use convert::{ArgValue, EnumVariants};
pub use descriptor::{ArgumentDescriptor, ValueConstraint};

pub(crate) use convert::CoerceFailure;
