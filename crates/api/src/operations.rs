//! The operation table: script-facing name, native entry point, parameter
//! schemas and payload packing for every call the surface exposes.

use hostbridge_schema::{Schema, types};

/// How validated arguments are packed into the request payload.
///
/// The callback argument is never part of the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload {
    /// The first argument, or null when omitted.
    Single,
    /// Always null.
    None,
    /// `[arg0, arg1]`.
    Pair,
}

#[derive(Debug, Clone, Copy)]
pub struct OperationDef {
    /// Script-facing name, e.g. `tabs.get`.
    pub name: &'static str,
    /// Native entry point, e.g. `GetTab`.
    pub native: &'static str,
    pub payload: Payload,
    /// Builds the positional parameter schemas.
    pub params: fn() -> Vec<Schema>,
}

impl OperationDef {
    pub fn schemas(&self) -> Vec<Schema> {
        (self.params)()
    }
}

const fn op(
    name: &'static str,
    native: &'static str,
    payload: Payload,
    params: fn() -> Vec<Schema>,
) -> OperationDef {
    OperationDef {
        name,
        native,
        payload,
        params,
    }
}

/// Every operation, grouped by namespace.
pub static OPERATIONS: &[OperationDef] = &[
    // ── windows ──
    op("windows.get", "GetWindow", Payload::Single, || {
        vec![types::p_int(), types::fun()]
    }),
    op("windows.getCurrent", "GetCurrentWindow", Payload::None, || {
        vec![types::fun()]
    }),
    op("windows.getLastFocused", "GetLastFocusedWindow", Payload::None, || {
        vec![types::fun()]
    }),
    op("windows.getAll", "GetAllWindows", Payload::Single, || {
        vec![types::opt_bool(), types::fun()]
    }),
    op("windows.create", "CreateWindow", Payload::Single, || {
        vec![
            Schema::object([
                ("url", types::opt_str()),
                ("left", types::opt_int()),
                ("top", types::opt_int()),
                ("width", types::opt_p_int()),
                ("height", types::opt_p_int()),
            ])
            .optional(),
            types::opt_fun(),
        ]
    }),
    op("windows.update", "UpdateWindow", Payload::Pair, || {
        vec![
            types::p_int(),
            Schema::object([
                ("left", types::opt_int()),
                ("top", types::opt_int()),
                ("width", types::opt_p_int()),
                ("height", types::opt_p_int()),
            ]),
            types::opt_fun(),
        ]
    }),
    op("windows.remove", "RemoveWindow", Payload::Single, || {
        vec![types::p_int(), types::opt_fun()]
    }),
    // ── tabs ──
    op("tabs.get", "GetTab", Payload::Single, || {
        vec![types::p_int(), types::fun()]
    }),
    op("tabs.getSelected", "GetSelectedTab", Payload::Single, || {
        vec![types::opt_p_int(), types::fun()]
    }),
    op("tabs.getAllInWindow", "GetAllTabsInWindow", Payload::Single, || {
        vec![types::opt_p_int(), types::fun()]
    }),
    op("tabs.create", "CreateTab", Payload::Single, || {
        vec![
            Schema::object([
                ("windowId", types::opt_p_int()),
                ("index", types::opt_p_int()),
                ("url", types::opt_str()),
                ("selected", types::opt_bool()),
            ]),
            types::opt_fun(),
        ]
    }),
    op("tabs.update", "UpdateTab", Payload::Pair, || {
        vec![
            types::p_int(),
            Schema::object([("url", types::opt_str()), ("selected", types::opt_bool())]),
            types::opt_fun(),
        ]
    }),
    op("tabs.move", "MoveTab", Payload::Pair, || {
        vec![
            types::p_int(),
            Schema::object([("windowId", types::opt_p_int()), ("index", types::p_int())]),
            types::opt_fun(),
        ]
    }),
    op("tabs.remove", "RemoveTab", Payload::Single, || {
        vec![types::p_int(), types::opt_fun()]
    }),
    // ── pageActions ──
    op("pageActions.enableForTab", "EnablePageAction", Payload::Pair, || {
        vec![
            types::str(),
            Schema::object([("tabId", types::p_int()), ("url", types::str())]),
        ]
    }),
    // ── bookmarks ──
    op("bookmarks.get", "GetBookmarks", Payload::Single, || {
        vec![Schema::array(types::p_int()).optional(), types::fun()]
    }),
    op("bookmarks.getChildren", "GetBookmarkChildren", Payload::Single, || {
        vec![types::p_int(), types::fun()]
    }),
    op("bookmarks.getTree", "GetBookmarkTree", Payload::None, || {
        vec![types::fun()]
    }),
    op("bookmarks.search", "SearchBookmarks", Payload::Single, || {
        vec![types::str(), types::fun()]
    }),
    op("bookmarks.remove", "RemoveBookmark", Payload::Single, || {
        vec![
            Schema::object([("id", types::p_int()), ("recursive", types::opt_bool())]),
            types::opt_fun(),
        ]
    }),
    op("bookmarks.create", "CreateBookmark", Payload::Single, || {
        vec![
            Schema::object([
                ("parentId", types::opt_p_int()),
                ("index", types::opt_p_int()),
                ("title", types::opt_str()),
                ("url", types::opt_str()),
            ]),
            types::opt_fun(),
        ]
    }),
    op("bookmarks.move", "MoveBookmark", Payload::Single, || {
        vec![
            Schema::object([
                ("id", types::p_int()),
                ("parentId", types::opt_p_int()),
                ("index", types::opt_p_int()),
            ]),
            types::opt_fun(),
        ]
    }),
    op("bookmarks.setTitle", "SetBookmarkTitle", Payload::Single, || {
        vec![
            Schema::object([("id", types::p_int()), ("title", types::opt_str())]),
            types::opt_fun(),
        ]
    }),
];

pub fn find(name: &str) -> Option<&'static OperationDef> {
    OPERATIONS.iter().find(|def| def.name == name)
}
