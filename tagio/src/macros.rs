// Shorthand for return Err(TagIoError::new(ErrorKind::Foo))
//
// Usage:
// - err!(Variant)        -> return Err(TagIoError::new(ErrorKind::Variant))
// - err!(Variant(value)) -> return Err(TagIoError::new(ErrorKind::Variant(value)))
macro_rules! err {
	($variant:ident) => {
		return Err(crate::error::TagIoError::new(
			crate::error::ErrorKind::$variant,
		))
	};
	($variant:ident($value:expr)) => {
		return Err(crate::error::TagIoError::new(
			crate::error::ErrorKind::$variant($value),
		))
	};
}

// Shorthand for TagIoError::new(ErrorKind::InvalidArgument(format!(...)))
//
// Usage:
//
// - invalid_arg!("field `{}` is missing", name)
//
// or bail:
//
// - invalid_arg!(@BAIL "field `{}` is missing", name)
macro_rules! invalid_arg {
	(@BAIL $($arg:tt)*) => {
		return Err(invalid_arg!($($arg)*))
	};
	($($arg:tt)*) => {
		crate::error::TagIoError::new(crate::error::ErrorKind::InvalidArgument(format!($($arg)*)))
	};
}

pub(crate) use {err, invalid_arg};
