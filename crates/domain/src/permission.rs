use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use warden_core::{AppError, AppResult, NonEmptyString};

/// Effective set of permission names granted to a role or user.
pub type PermissionSet = BTreeSet<String>;

/// Feature areas used to group catalog entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PermissionGroup {
    /// User administration pages.
    Users,
    /// Role administration pages.
    Roles,
    /// Product category pages.
    Categories,
    /// Product pages.
    Products,
}

impl PermissionGroup {
    /// Returns the display label for the group.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Users => "Users",
            Self::Roles => "Roles",
            Self::Categories => "Categories",
            Self::Products => "Products",
        }
    }
}

/// Permissions compiled into the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AppPermission {
    /// Allows listing users.
    UsersView,
    /// Allows creating users.
    UsersCreate,
    /// Allows editing users and their role memberships.
    UsersEdit,
    /// Allows deleting users.
    UsersDelete,
    /// Allows editing per-user grants and prohibits.
    UsersChangePermissions,
    /// Allows listing roles.
    RolesView,
    /// Allows creating roles.
    RolesCreate,
    /// Allows editing roles and their grants.
    RolesEdit,
    /// Allows deleting roles.
    RolesDelete,
    /// Allows listing categories.
    CategoriesView,
    /// Allows creating categories.
    CategoriesCreate,
    /// Allows editing categories.
    CategoriesEdit,
    /// Allows deleting categories.
    CategoriesDelete,
    /// Allows listing products.
    ProductsView,
    /// Allows creating products.
    ProductsCreate,
    /// Allows editing products.
    ProductsEdit,
    /// Allows deleting products.
    ProductsDelete,
}

impl AppPermission {
    /// Returns the stable permission name used in storage and tokens.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UsersView => "Pages.Administration.Users",
            Self::UsersCreate => "Pages.Administration.Users.Create",
            Self::UsersEdit => "Pages.Administration.Users.Edit",
            Self::UsersDelete => "Pages.Administration.Users.Delete",
            Self::UsersChangePermissions => "Pages.Administration.Users.ChangePermissions",
            Self::RolesView => "Pages.Administration.Roles",
            Self::RolesCreate => "Pages.Administration.Roles.Create",
            Self::RolesEdit => "Pages.Administration.Roles.Edit",
            Self::RolesDelete => "Pages.Administration.Roles.Delete",
            Self::CategoriesView => "Pages.Categories",
            Self::CategoriesCreate => "Pages.Categories.Create",
            Self::CategoriesEdit => "Pages.Categories.Edit",
            Self::CategoriesDelete => "Pages.Categories.Delete",
            Self::ProductsView => "Pages.Products",
            Self::ProductsCreate => "Pages.Products.Create",
            Self::ProductsEdit => "Pages.Products.Edit",
            Self::ProductsDelete => "Pages.Products.Delete",
        }
    }

    /// Returns the human-readable label shown in administration screens.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::UsersView => "View Users",
            Self::UsersCreate => "Create Users",
            Self::UsersEdit => "Edit Users",
            Self::UsersDelete => "Delete Users",
            Self::UsersChangePermissions => "Change User Permissions",
            Self::RolesView => "View Roles",
            Self::RolesCreate => "Create Roles",
            Self::RolesEdit => "Edit Roles",
            Self::RolesDelete => "Delete Roles",
            Self::CategoriesView => "View Categories",
            Self::CategoriesCreate => "Create Categories",
            Self::CategoriesEdit => "Edit Categories",
            Self::CategoriesDelete => "Delete Categories",
            Self::ProductsView => "View Products",
            Self::ProductsCreate => "Create Products",
            Self::ProductsEdit => "Edit Products",
            Self::ProductsDelete => "Delete Products",
        }
    }

    /// Returns the feature area this permission belongs to.
    #[must_use]
    pub fn group(&self) -> PermissionGroup {
        match self {
            Self::UsersView
            | Self::UsersCreate
            | Self::UsersEdit
            | Self::UsersDelete
            | Self::UsersChangePermissions => PermissionGroup::Users,
            Self::RolesView | Self::RolesCreate | Self::RolesEdit | Self::RolesDelete => {
                PermissionGroup::Roles
            }
            Self::CategoriesView
            | Self::CategoriesCreate
            | Self::CategoriesEdit
            | Self::CategoriesDelete => PermissionGroup::Categories,
            Self::ProductsView | Self::ProductsCreate | Self::ProductsEdit | Self::ProductsDelete => {
                PermissionGroup::Products
            }
        }
    }

    /// Returns all compiled permissions.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[AppPermission] = &[
            AppPermission::UsersView,
            AppPermission::UsersCreate,
            AppPermission::UsersEdit,
            AppPermission::UsersDelete,
            AppPermission::UsersChangePermissions,
            AppPermission::RolesView,
            AppPermission::RolesCreate,
            AppPermission::RolesEdit,
            AppPermission::RolesDelete,
            AppPermission::CategoriesView,
            AppPermission::CategoriesCreate,
            AppPermission::CategoriesEdit,
            AppPermission::CategoriesDelete,
            AppPermission::ProductsView,
            AppPermission::ProductsCreate,
            AppPermission::ProductsEdit,
            AppPermission::ProductsDelete,
        ];

        ALL
    }
}

impl FromStr for AppPermission {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|permission| permission.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("invalid permission name '{value}'")))
    }
}

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    name: String,
    display_name: String,
    group: String,
}

impl Permission {
    /// Creates a catalog entry.
    pub fn new(
        name: impl Into<String>,
        display_name: impl Into<String>,
        group: impl Into<String>,
    ) -> AppResult<Self> {
        Ok(Self {
            name: NonEmptyString::new(name)?.into(),
            display_name: display_name.into(),
            group: group.into(),
        })
    }

    /// Returns the permission name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the display label.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Returns the feature group label.
    #[must_use]
    pub fn group(&self) -> &str {
        self.group.as_str()
    }
}

impl From<AppPermission> for Permission {
    fn from(value: AppPermission) -> Self {
        Self {
            name: value.as_str().to_owned(),
            display_name: value.display_name().to_owned(),
            group: value.group().as_str().to_owned(),
        }
    }
}

/// Process-wide, read-only table of every known permission.
///
/// Built once at startup and shared behind an `Arc` by every component that
/// needs to expand the admin role or validate permission names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionCatalog {
    permissions: Vec<Permission>,
}

impl PermissionCatalog {
    /// Builds a catalog from explicit entries, rejecting duplicate names.
    pub fn new(permissions: Vec<Permission>) -> AppResult<Self> {
        let mut seen = HashSet::new();
        for permission in &permissions {
            if !seen.insert(permission.name()) {
                return Err(AppError::Validation(format!(
                    "duplicate permission name '{}' in catalog",
                    permission.name()
                )));
            }
        }

        Ok(Self { permissions })
    }

    /// Builds the catalog of compiled platform permissions.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            permissions: AppPermission::all()
                .iter()
                .copied()
                .map(Permission::from)
                .collect(),
        }
    }

    /// Returns every catalog entry in declaration order.
    #[must_use]
    pub fn permissions(&self) -> &[Permission] {
        self.permissions.as_slice()
    }

    /// Returns every permission name as a set.
    #[must_use]
    pub fn all_names(&self) -> PermissionSet {
        self.permissions
            .iter()
            .map(|permission| permission.name().to_owned())
            .collect()
    }

    /// Returns whether the catalog knows the permission name.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Finds a catalog entry by name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Permission> {
        self.permissions
            .iter()
            .find(|permission| permission.name() == name)
    }

    /// Groups catalog entries by feature area, keeping declaration order within a group.
    #[must_use]
    pub fn grouped(&self) -> BTreeMap<&str, Vec<&Permission>> {
        let mut groups: BTreeMap<&str, Vec<&Permission>> = BTreeMap::new();
        for permission in &self.permissions {
            groups.entry(permission.group()).or_default().push(permission);
        }

        groups
    }

    /// Fails with a validation error naming the first unknown permission.
    pub fn validate_names<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> AppResult<()> {
        for name in names {
            if !self.contains(name) {
                return Err(AppError::Validation(format!(
                    "invalid permission name '{name}'"
                )));
            }
        }

        Ok(())
    }
}

impl Default for PermissionCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{AppPermission, Permission, PermissionCatalog};

    #[test]
    fn standard_catalog_contains_every_compiled_permission() {
        let catalog = PermissionCatalog::standard();
        assert_eq!(catalog.permissions().len(), 17);
        assert!(catalog.contains("Pages.Administration.Users.ChangePermissions"));
        assert!(catalog.contains("Pages.Products.Delete"));
    }

    #[test]
    fn catalog_groups_by_feature_area() {
        let catalog = PermissionCatalog::standard();
        let groups = catalog.grouped();
        assert_eq!(groups.len(), 4);
        assert_eq!(groups.get("Users").map(Vec::len), Some(5));
        assert_eq!(groups.get("Roles").map(Vec::len), Some(4));
    }

    #[test]
    fn validate_names_rejects_unknown_permission() {
        let catalog = PermissionCatalog::standard();
        let result = catalog.validate_names(["Pages.Administration.Users", "Pages.Unknown"]);
        assert!(result.is_err());
        assert!(
            result
                .err()
                .map(|error| error.to_string().contains("invalid permission name"))
                .unwrap_or(false)
        );
    }

    #[test]
    fn validate_names_accepts_catalog_names() {
        let catalog = PermissionCatalog::standard();
        assert!(
            catalog
                .validate_names(["Pages.Categories", "Pages.Categories.Edit"])
                .is_ok()
        );
    }

    #[test]
    fn catalog_rejects_duplicate_names() {
        let entries = vec![
            Permission::from(AppPermission::ProductsView),
            Permission::from(AppPermission::ProductsView),
        ];
        assert!(PermissionCatalog::new(entries).is_err());
    }

    #[test]
    fn app_permission_parses_stored_name() {
        let parsed = AppPermission::from_str("Pages.Administration.Roles.Edit");
        assert!(matches!(parsed, Ok(AppPermission::RolesEdit)));
        assert!(AppPermission::from_str("pages.administration.roles.edit").is_err());
    }
}
