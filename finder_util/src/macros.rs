#[macro_export]
macro_rules! opt {
    (, $default:ident) => {
        $default
    };
    ($optional:expr, $default:ident) => {
        $optional
    };
}

#[macro_export]
macro_rules! params_internal {
    ($vec:ident, required, $key:expr, $val:expr) => {
        $vec.push(($key, $val.to_string()));
    };
    ($vec:ident, optional, $key:expr, $val:expr) => {
        if let Some(ref v) = $val {
            $vec.push(($key, v.to_string()));
        }
    };
}

/// Builds an ordered list of query pairs, skipping optional values that are `None`.
/// The parameter name is the identifier itself, so it must match the wire name.
/// ```
/// let address = "Portland, ME";
/// let fields: Option<&str> = None;
/// let params = finder_util::build_params! {
///     required address,
///     optional fields,
///     required limit => 10,
/// };
/// assert_eq!(params, vec![
///     ("address".to_string(), "Portland, ME".to_string()),
///     ("limit".to_string(), "10".to_string()),
/// ]);
/// ```
#[macro_export]
macro_rules! build_params {
    (
        $(
            $kind:ident $name:ident $( => $val:expr )?
        ),+ $(,)?
    ) => {
        {
            let mut params: Vec<(String, String)> = Vec::new();
            $(
                $crate::params_internal!(
                    params,
                    $kind,
                    stringify!($name).to_string(),
                    $crate::opt!($( $val )?, $name)
                );
            )+
            params
        }
    };
}
