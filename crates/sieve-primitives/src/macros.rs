#[macro_export]
macro_rules! primitive_kind_registry_entries {
    ($macro:ident $(, @args $($args:tt)+ )?) => {
        $macro! {
            $(
                @args $($args)+;
            )?
            @entries
            (
                Bool,
                "boolean",
                supports_equality = true,
                supports_ordering = false,
                is_nullish = false
            ),
            (
                Number,
                "number",
                supports_equality = true,
                supports_ordering = true,
                is_nullish = false
            ),
            (
                Text,
                "string",
                supports_equality = true,
                supports_ordering = true,
                is_nullish = false
            ),
            (
                Null,
                "null",
                supports_equality = true,
                supports_ordering = false,
                is_nullish = true
            ),
            (
                Undefined,
                "undefined",
                supports_equality = true,
                supports_ordering = false,
                is_nullish = true
            ),
        }
    };
}

#[macro_export]
macro_rules! primitive_kind_registry {
    ($macro:ident) => {
        $crate::primitive_kind_registry_entries!($macro)
    };
    ($macro:ident, $($args:tt)+) => {
        $crate::primitive_kind_registry_entries!($macro, @args $($args)+)
    };
}

macro_rules! metadata_from_registry {
    ( @args $kind:expr; @entries $( ($primitive:ident, $label:literal, supports_equality = $supports_equality:expr, supports_ordering = $supports_ordering:expr, is_nullish = $is_nullish:expr) ),* $(,)? ) => {
        match $kind {
            $(
                $crate::PrimitiveKind::$primitive => $crate::PrimitiveMetadata {
                    label: $label,
                    supports_equality: $supports_equality,
                    supports_ordering: $supports_ordering,
                    is_nullish: $is_nullish,
                },
            )*
        }
    };
}

macro_rules! from_label_from_registry {
    ( @args $label:expr; @entries $( ($primitive:ident, $kind_label:literal, supports_equality = $supports_equality:expr, supports_ordering = $supports_ordering:expr, is_nullish = $is_nullish:expr) ),* $(,)? ) => {
        match $label {
            $( $kind_label => Some($crate::PrimitiveKind::$primitive), )*
            _ => None,
        }
    };
}

macro_rules! all_kinds_from_registry {
    ( @entries $( ($primitive:ident, $label:literal, supports_equality = $supports_equality:expr, supports_ordering = $supports_ordering:expr, is_nullish = $is_nullish:expr) ),* $(,)? ) => {
        [ $( $crate::PrimitiveKind::$primitive ),* ]
    };
}
