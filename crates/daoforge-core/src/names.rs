//! Name transforms between logical, physical, display, and field spellings.

use convert_case::{Case, Casing};

/// Default physical name for a logical name.
///
/// Inserts underscores at lower-to-upper boundaries and where an acronym
/// run meets mixed case, then uppercases: `ABCTelevision` becomes
/// `ABC_TELEVISION`, `OrderLine` becomes `ORDER_LINE`.
pub fn default_physical_name(logical: &str) -> String {
    logical.to_case(Case::Constant)
}

/// Display name derived from a physical name.
///
/// The structural inverse of [`default_physical_name`]:
/// `ABC_TELEVISION` becomes `AbcTelevision`.
pub fn display_name(physical: &str) -> String {
    physical.to_case(Case::Pascal)
}

/// Field name used in generated code: `CustomerName` becomes
/// `customer_name`.
pub fn field_name(logical: &str) -> String {
    logical.to_case(Case::Snake)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_acronym_runs() {
        assert_eq!(default_physical_name("ABCTelevision"), "ABC_TELEVISION");
    }

    #[test]
    fn splits_camel_boundaries() {
        assert_eq!(default_physical_name("OrderLine"), "ORDER_LINE");
        assert_eq!(default_physical_name("CustomerName"), "CUSTOMER_NAME");
    }

    #[test]
    fn single_word_is_uppercased() {
        assert_eq!(default_physical_name("Customer"), "CUSTOMER");
    }

    #[test]
    fn display_name_inverts_physical() {
        assert_eq!(display_name("ABC_TELEVISION"), "AbcTelevision");
        assert_eq!(display_name("ORDER_LINE"), "OrderLine");
    }

    #[test]
    fn physical_of_display_is_stable() {
        let physical = "ABC_TELEVISION";
        assert_eq!(default_physical_name(&display_name(physical)), physical);
    }

    #[test]
    fn field_names_are_snake_case() {
        assert_eq!(field_name("CustomerName"), "customer_name");
        assert_eq!(field_name("Id"), "id");
    }
}
