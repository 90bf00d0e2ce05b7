//! The ARIA role table.
//!
//! Each role with an implicit HTML mapping has a [`RoleSelector`]: an exact
//! CSS pattern, conditional patterns whose side conditions must also hold,
//! or both. Roles without a selector are ARIA-only and can only be taken via
//! an explicit `role` attribute.

use crate::dom::{parse_selector, BoolProperty, StringProperty};
use crate::result::SemlocResult;
use scraper::Selector;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

macro_rules! aria_roles {
    ($($variant:ident => $name:literal),* $(,)?) => {
        /// A WAI-ARIA 1.1 role usable in a locator
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum AriaRole {
            $(
                #[doc = concat!("`", $name, "`")]
                $variant,
            )*
        }

        impl AriaRole {
            /// Every role, alphabetically
            pub const ALL: &'static [Self] = &[$(Self::$variant),*];

            /// The role name as written in `role` attributes and locators
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)*
                }
            }
        }

        impl FromStr for AriaRole {
            type Err = UnknownRole;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok(Self::$variant),)*
                    _ => Err(UnknownRole(s.to_string())),
                }
            }
        }
    };
}

aria_roles! {
    Alert => "alert",
    AlertDialog => "alertdialog",
    Application => "application",
    Article => "article",
    Banner => "banner",
    Button => "button",
    Cell => "cell",
    Checkbox => "checkbox",
    ColumnHeader => "columnheader",
    Combobox => "combobox",
    Complementary => "complementary",
    ContentInfo => "contentinfo",
    Definition => "definition",
    Dialog => "dialog",
    Directory => "directory",
    Document => "document",
    Feed => "feed",
    Figure => "figure",
    Form => "form",
    Grid => "grid",
    GridCell => "gridcell",
    Group => "group",
    Heading => "heading",
    Img => "img",
    Link => "link",
    List => "list",
    Listbox => "listbox",
    ListItem => "listitem",
    Log => "log",
    Main => "main",
    Marquee => "marquee",
    Math => "math",
    Menu => "menu",
    MenuBar => "menubar",
    MenuItem => "menuitem",
    MenuItemCheckbox => "menuitemcheckbox",
    MenuItemRadio => "menuitemradio",
    Navigation => "navigation",
    Note => "note",
    Option => "option",
    ProgressBar => "progressbar",
    Radio => "radio",
    RadioGroup => "radiogroup",
    Region => "region",
    Row => "row",
    RowGroup => "rowgroup",
    RowHeader => "rowheader",
    Scrollbar => "scrollbar",
    Search => "search",
    Searchbox => "searchbox",
    Separator => "separator",
    Slider => "slider",
    SpinButton => "spinbutton",
    Status => "status",
    Switch => "switch",
    Tab => "tab",
    Table => "table",
    TabList => "tablist",
    TabPanel => "tabpanel",
    Term => "term",
    Textbox => "textbox",
    Timer => "timer",
    Toolbar => "toolbar",
    Tooltip => "tooltip",
    Tree => "tree",
    TreeGrid => "treegrid",
    TreeItem => "treeitem",
}

impl fmt::Display for AriaRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A string which isn't an ARIA role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown role: {}", self.0)
    }
}

impl std::error::Error for UnknownRole {}

/// Explicit roles which strip an element of its semantics
pub const IGNORED_ROLES: &[&str] = &["presentation", "none"];

/// Roles whose descendants are presentational
/// (<https://www.w3.org/TR/wai-aria-practices/#children_presentational>)
pub const CHILDREN_PRESENTATIONAL: &[AriaRole] = &[
    AriaRole::Button,
    AriaRole::Checkbox,
    AriaRole::Img,
    AriaRole::Math,
    AriaRole::MenuItemCheckbox,
    AriaRole::MenuItemRadio,
    AriaRole::Option,
    AriaRole::ProgressBar,
    AriaRole::Radio,
    AriaRole::Scrollbar,
    AriaRole::Separator,
    AriaRole::Slider,
    AriaRole::Switch,
    AriaRole::Tab,
];

impl AriaRole {
    /// Whether descendants of elements with this role lose their semantics
    #[must_use]
    pub fn is_children_presentational(self) -> bool {
        CHILDREN_PRESENTATIONAL.contains(&self)
    }

    /// Whether the role has no implicit HTML mapping
    #[must_use]
    pub fn is_aria_only(self) -> bool {
        registry().selector_for(self).is_none()
    }
}

/// A compiled CSS pattern which remembers its source text
#[derive(Debug, Clone)]
pub struct CssPattern {
    source: &'static str,
    selector: Selector,
}

impl CssPattern {
    /// Compile a pattern
    pub fn parse(source: &'static str) -> SemlocResult<Self> {
        Ok(Self {
            source,
            selector: parse_selector(source)?,
        })
    }

    #[allow(clippy::expect_used)]
    fn new(source: &'static str) -> Self {
        Self {
            source,
            selector: Selector::parse(source).expect("role table selectors are valid"),
        }
    }

    /// The pattern as written in the role table
    #[must_use]
    pub const fn source(&self) -> &'static str {
        self.source
    }

    /// The compiled selector
    #[must_use]
    pub const fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Tag names the pattern's subjects can have
    fn subject_tags(&self) -> impl Iterator<Item = &'static str> {
        let source: &'static str = self.source;
        source.split(',').filter_map(|part| {
            let compound = part.trim().rsplit(|c: char| c == ' ' || c == '>').next()?;
            let end = compound
                .find(|c: char| !c.is_ascii_alphanumeric())
                .unwrap_or(compound.len());
            Some(&compound[..end]).filter(|tag| !tag.is_empty())
        })
    }
}

/// Side predicate of a conditional pattern, evaluated by
/// [`evaluate_condition`](crate::role::evaluate_condition)
#[derive(Debug, Clone)]
pub enum Condition {
    /// The attribute is present and numerically greater than `value`
    AttributeValueGreaterThan {
        /// Attribute name
        attribute: &'static str,
        /// Exclusive lower bound
        value: f64,
    },
    /// The attribute is present and numerically less than `value`
    AttributeValueLessThan {
        /// Attribute name
        attribute: &'static str,
        /// Exclusive upper bound
        value: f64,
    },
    /// The element is labelled by `aria-label` or `aria-labelledby`
    HasAccessibleName,
    /// No ancestor-or-self matches the pattern
    ForbiddenAncestors(CssPattern),
    /// A boolean property takes the given value
    PropertyTakesBoolValue {
        /// Property probe
        property: BoolProperty,
        /// Expected value
        value: bool,
    },
    /// A string property takes one of the given values
    PropertyTakesOneOfStringValues {
        /// Property probe
        property: StringProperty,
        /// Accepted values
        values: &'static [&'static str],
    },
    /// The closest ancestor with tag `tag` has role `role`
    ClosestAncestorTagHasRole {
        /// Ancestor tag name
        tag: &'static str,
        /// Required role of that ancestor
        role: AriaRole,
    },
    /// Whether the containing table has data cells in this cell's rows
    DataInRow(bool),
    /// Whether the containing table has data cells in this cell's columns
    DataInColumn(bool),
}

/// A pattern plus the conditions matching elements must also satisfy
#[derive(Debug, Clone)]
pub struct ConditionalSelector {
    /// Candidate pattern
    pub greedy: CssPattern,
    /// Conditions which must all hold
    pub conditions: Vec<Condition>,
}

/// Native HTML definition of an implicit role
#[derive(Debug, Clone, Default)]
pub struct RoleSelector {
    /// Elements matching this pattern always take the role
    pub exact: Option<CssPattern>,
    /// Elements matching one of these (with its conditions) take the role
    pub conditional: Vec<ConditionalSelector>,
}

impl RoleSelector {
    fn exact(source: &'static str) -> Self {
        Self {
            exact: Some(CssPattern::new(source)),
            conditional: Vec::new(),
        }
    }

    fn when(mut self, greedy: &'static str, conditions: Vec<Condition>) -> Self {
        self.conditional.push(ConditionalSelector {
            greedy: CssPattern::new(greedy),
            conditions,
        });
        self
    }

    fn conditional(greedy: &'static str, conditions: Vec<Condition>) -> Self {
        Self::default().when(greedy, conditions)
    }

    fn patterns(&self) -> impl Iterator<Item = &CssPattern> {
        self.exact
            .iter()
            .chain(self.conditional.iter().map(|c| &c.greedy))
    }
}

/// The process-wide role table
#[derive(Debug)]
pub struct RoleRegistry {
    selectors: HashMap<AriaRole, RoleSelector>,
    roles_for_tag: HashMap<&'static str, Vec<AriaRole>>,
    presentational_parents: Selector,
}

static REGISTRY: LazyLock<RoleRegistry> = LazyLock::new(RoleRegistry::build);

/// The role table
#[must_use]
pub fn registry() -> &'static RoleRegistry {
    &REGISTRY
}

const LANDMARK_SCOPES: &str = "article, aside, main, nav, section, [role=article], \
     [role=complementary], [role=main], [role=navigation], [role=region]";

const TEXTBOX_TYPES: &[&str] = &["email", "tel", "text", "url"];
const COMBOBOX_TYPES: &[&str] = &["email", "search", "tel", "text", "url"];

impl RoleRegistry {
    fn build() -> Self {
        use AriaRole as R;
        use Condition as C;

        let in_table = |role| C::ClosestAncestorTagHasRole { tag: "table", role };
        let header_cells = |row: bool, column: Option<bool>| {
            let mut selector = RoleSelector::default();
            for table_role in [R::Table, R::Grid, R::TreeGrid] {
                let mut conditions = vec![in_table(table_role), C::DataInRow(row)];
                conditions.extend(column.map(C::DataInColumn));
                selector = selector.when("th", conditions);
            }
            selector
        };

        let entries: Vec<(AriaRole, RoleSelector)> = vec![
            (R::Article, RoleSelector::exact("article")),
            (
                R::Banner,
                RoleSelector::conditional(
                    "header",
                    vec![C::ForbiddenAncestors(CssPattern::new(LANDMARK_SCOPES))],
                ),
            ),
            (
                R::Button,
                RoleSelector::exact(
                    "button, input[type=button], input[type=image], input[type=reset], \
                     input[type=submit], summary",
                ),
            ),
            (
                R::Cell,
                RoleSelector::conditional("td", vec![in_table(R::Table)]).when(
                    "th",
                    vec![in_table(R::Table), C::DataInRow(true), C::DataInColumn(true)],
                ),
            ),
            (R::Checkbox, RoleSelector::exact("input[type=checkbox]")),
            (R::ColumnHeader, header_cells(false, None)),
            (
                R::Combobox,
                RoleSelector::exact("select:not([multiple]):not([size])")
                    .when(
                        "select[size]",
                        vec![
                            C::PropertyTakesBoolValue {
                                property: BoolProperty::Multiple,
                                value: false,
                            },
                            C::AttributeValueLessThan {
                                attribute: "size",
                                value: 2.0,
                            },
                        ],
                    )
                    .when(
                        "input[list]",
                        vec![C::PropertyTakesOneOfStringValues {
                            property: StringProperty::Type,
                            values: COMBOBOX_TYPES,
                        }],
                    ),
            ),
            (R::Complementary, RoleSelector::exact("aside")),
            (
                R::ContentInfo,
                RoleSelector::conditional(
                    "footer",
                    vec![C::ForbiddenAncestors(CssPattern::new(LANDMARK_SCOPES))],
                ),
            ),
            (R::Definition, RoleSelector::exact("dd")),
            (R::Dialog, RoleSelector::exact("dialog")),
            (R::Document, RoleSelector::exact("body")),
            (R::Figure, RoleSelector::exact("figure")),
            (
                R::Form,
                RoleSelector::conditional("form", vec![C::HasAccessibleName]),
            ),
            (
                R::GridCell,
                RoleSelector::conditional("td", vec![in_table(R::Grid)])
                    .when("td", vec![in_table(R::TreeGrid)]),
            ),
            (R::Group, RoleSelector::exact("details, fieldset, optgroup")),
            (R::Heading, RoleSelector::exact("h1, h2, h3, h4, h5, h6")),
            (R::Img, RoleSelector::exact("img[alt]:not([alt=\"\"]), img:not([alt])")),
            (R::Link, RoleSelector::exact("a[href], area[href]")),
            (R::List, RoleSelector::exact("menu, ol, ul")),
            (
                R::Listbox,
                RoleSelector::exact("datalist, select[multiple]").when(
                    "select[size]",
                    vec![C::AttributeValueGreaterThan {
                        attribute: "size",
                        value: 1.0,
                    }],
                ),
            ),
            (R::ListItem, RoleSelector::exact("li")),
            (R::Main, RoleSelector::exact("main")),
            (R::Math, RoleSelector::exact("math")),
            (R::Navigation, RoleSelector::exact("nav")),
            (
                R::Option,
                RoleSelector::exact(
                    "select > option, select > optgroup > option, datalist > option",
                ),
            ),
            (R::ProgressBar, RoleSelector::exact("progress")),
            (R::Radio, RoleSelector::exact("input[type=radio]")),
            (
                R::Region,
                RoleSelector::conditional("section", vec![C::HasAccessibleName]),
            ),
            (R::Row, RoleSelector::exact("tr")),
            (R::RowGroup, RoleSelector::exact("tbody, tfoot, thead")),
            (R::RowHeader, header_cells(true, Some(false))),
            (
                R::Searchbox,
                RoleSelector::conditional(
                    "input:not([list])",
                    vec![C::PropertyTakesOneOfStringValues {
                        property: StringProperty::Type,
                        values: &["search"],
                    }],
                ),
            ),
            (R::Separator, RoleSelector::exact("hr")),
            (R::Slider, RoleSelector::exact("input[type=range]")),
            (R::SpinButton, RoleSelector::exact("input[type=number]")),
            (R::Status, RoleSelector::exact("output")),
            (R::Table, RoleSelector::exact("table")),
            (R::Term, RoleSelector::exact("dfn, dt")),
            (
                R::Textbox,
                RoleSelector::exact("textarea").when(
                    "input:not([list])",
                    vec![C::PropertyTakesOneOfStringValues {
                        property: StringProperty::Type,
                        values: TEXTBOX_TYPES,
                    }],
                ),
            ),
        ];

        let mut roles_for_tag: HashMap<&'static str, Vec<AriaRole>> = HashMap::new();
        for (role, selector) in &entries {
            for tag in selector.patterns().flat_map(CssPattern::subject_tags) {
                let roles = roles_for_tag.entry(tag).or_default();
                if !roles.contains(role) {
                    roles.push(*role);
                }
            }
        }

        let selectors: HashMap<_, _> = entries.into_iter().collect();
        let presentational_parents = Self::presentational_parents_selector(&selectors);

        Self {
            selectors,
            roles_for_tag,
            presentational_parents,
        }
    }

    /// Union of the exact patterns of every children-presentational role.
    ///
    /// Sound only while none of those roles needs a side condition evaluated
    /// on an element which can have descendants.
    #[allow(clippy::expect_used)]
    fn presentational_parents_selector(selectors: &HashMap<AriaRole, RoleSelector>) -> Selector {
        let sources: Vec<&str> = CHILDREN_PRESENTATIONAL
            .iter()
            .filter_map(|role| selectors.get(role))
            .inspect(|selector| {
                debug_assert!(
                    selector
                        .conditional
                        .iter()
                        .all(|c| c.greedy.subject_tags().all(|tag| tag == "input")),
                    "children-presentational role needs conditions: {selector:?}"
                );
            })
            .filter_map(|selector| selector.exact.as_ref().map(CssPattern::source))
            .collect();
        Selector::parse(&sources.join(", ")).expect("role table selectors are valid")
    }

    /// The implicit definition of a role, `None` for ARIA-only roles
    #[must_use]
    pub fn selector_for(&self, role: AriaRole) -> Option<&RoleSelector> {
        self.selectors.get(&role)
    }

    /// Candidate implicit roles for a tag, in table order
    #[must_use]
    pub fn implicit_roles_for_tag(&self, tag: &str) -> &[AriaRole] {
        self.roles_for_tag.get(tag).map_or(&[], Vec::as_slice)
    }

    /// Selector matching elements which implicitly take a
    /// children-presentational role
    #[must_use]
    pub const fn presentational_parents(&self) -> &Selector {
        &self.presentational_parents
    }
}
