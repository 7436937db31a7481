//! Fixed listing catalog: categories, subcategories and conditions.
//!
//! Listings store the category *display name* (e.g. "GPUs") while URLs and
//! form selections use the slug (e.g. `gpu`).

/// A top-level hardware category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    pub name: &'static str,
    pub slug: &'static str,
    pub subcategories: &'static [&'static str],
}

/// Categories shown in the sidebar and listing form.
pub const CATEGORIES: &[Category] = &[
    Category {
        name: "CPUs",
        slug: "cpu",
        subcategories: &["Intel", "AMD", "ARM"],
    },
    Category {
        name: "GPUs",
        slug: "gpu",
        subcategories: &["NVIDIA", "AMD", "Intel"],
    },
    Category {
        name: "Motherboards",
        slug: "motherboard",
        subcategories: &["ATX", "Micro-ATX", "Mini-ITX"],
    },
    Category {
        name: "RAM",
        slug: "ram",
        subcategories: &["DDR4", "DDR5"],
    },
    Category {
        name: "Storage",
        slug: "storage",
        subcategories: &["SSD", "HDD", "NVMe"],
    },
    Category {
        name: "Power Supplies",
        slug: "psu",
        subcategories: &["Modular", "Semi-Modular", "Non-Modular"],
    },
    Category {
        name: "Cases",
        slug: "case",
        subcategories: &["Full Tower", "Mid Tower", "Mini Tower"],
    },
    Category {
        name: "Cooling",
        slug: "cooling",
        subcategories: &["Air Cooler", "AIO", "Custom Loop"],
    },
];

/// Item conditions, best first.
pub const CONDITIONS: &[&str] = &["Like New", "Excellent", "Good", "Fair", "For Parts"];

impl Category {
    /// Look up a category by its slug (exact match).
    #[must_use]
    pub fn by_slug(slug: &str) -> Option<&'static Self> {
        CATEGORIES.iter().find(|c| c.slug == slug)
    }

    /// Look up a category by display name, ignoring case.
    #[must_use]
    pub fn by_name(name: &str) -> Option<&'static Self> {
        CATEGORIES.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Whether `subcategory` belongs to this category.
    #[must_use]
    pub fn has_subcategory(&self, subcategory: &str) -> bool {
        self.subcategories.contains(&subcategory)
    }
}
