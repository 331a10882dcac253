use hostbridge_protocol::{EventDescriptor, channels};

/// Payload shape of every well-known channel, for discovery.
pub static CHANNELS: &[(&str, &str)] = &[
    (channels::WINDOW_CREATED, "(windowId)"),
    (channels::WINDOW_REMOVED, "(windowId)"),
    (channels::WINDOW_FOCUS_CHANGED, "(windowId)"),
    (channels::TAB_CREATED, "({Tab})"),
    (channels::TAB_UPDATED, "(tabId, {changedProps})"),
    (channels::TAB_MOVED, "(tabId, {windowId, fromIndex, toIndex})"),
    (channels::TAB_SELECTION_CHANGED, "(tabId, {windowId})"),
    (channels::TAB_ATTACHED, "(tabId, {newWindowId, newPosition})"),
    (channels::TAB_DETACHED, "(tabId, {oldWindowId, oldPosition})"),
    (channels::TAB_REMOVED, "(tabId)"),
    (channels::PAGE_ACTION_EXECUTED, "({pageActionId, tabId, tabUrl})"),
    (channels::BOOKMARK_ADDED, "({id, title, url, parentId, index})"),
    (channels::BOOKMARK_REMOVED, "({parentId, index})"),
    (channels::BOOKMARK_CHANGED, "(id, {title})"),
    (channels::BOOKMARK_MOVED, "({id, parentId, index, oldParentId, oldIndex})"),
    (channels::BOOKMARK_CHILDREN_REORDERED, "(id, [childrenIds])"),
    (channels::CHANNEL_CONNECT, "(port)"),
];

pub fn describe_channels() -> Vec<EventDescriptor> {
    CHANNELS
        .iter()
        .map(|(name, shape)| EventDescriptor {
            name: (*name).to_string(),
            description: Some(format!("Sends {shape}.")),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use {super::*, hostbridge_protocol::KNOWN_CHANNELS};

    #[test]
    fn every_known_channel_is_described() {
        let described: Vec<&str> = CHANNELS.iter().map(|(name, _)| *name).collect();
        assert_eq!(described, KNOWN_CHANNELS);
    }

    #[test]
    fn descriptions_name_the_payload() {
        let tab_moved = describe_channels()
            .into_iter()
            .find(|d| d.name == channels::TAB_MOVED);
        assert_eq!(
            tab_moved.and_then(|d| d.description).as_deref(),
            Some("Sends (tabId, {windowId, fromIndex, toIndex}).")
        );
    }
}
