//! Operator-facing catalog of trigger categories.
//!
//! Pure data: one entry per selectable category, in the order the options are
//! presented. The catalog is informational; `Category::parse` accepts values
//! that are not listed here.

use serde::Serialize;

/// One selectable trigger category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryInfo {
    pub value: &'static str,
    pub label: &'static str,
    pub description: &'static str,
}

const fn entry(
    value: &'static str,
    label: &'static str,
    description: &'static str,
) -> CategoryInfo {
    CategoryInfo {
        value,
        label,
        description,
    }
}

pub const CATEGORY_CATALOG: &[CategoryInfo] = &[
    entry("app_deleted", "App Deleted", "When a user has deleted an app"),
    entry("app_home_opened", "App Home Opened", "When a user clicks into your App Home"),
    entry("app_installed", "App Installed", "When a user has installed an app"),
    entry("app_mention", "App Mention", "When your bot or app is mentioned in a channel"),
    entry("app_rate_limited", "App Rate Limited", "When your app's event subscriptions are being rate limited"),
    entry("app_requested", "App Requested", "When a user requested an app"),
    entry("app_uninstalled", "App Uninstalled", "When your Slack app was uninstalled"),
    entry("app_uninstalled_team", "App Uninstalled Team", "When a user has uninstalled an app"),
    entry("assistant_thread_context_changed", "Assistant Thread Context Changed", "When the context changed while an AI assistant thread was visible"),
    entry("assistant_thread_started", "Assistant Thread Started", "When an AI assistant thread was started"),
    entry("bot_added", "Bot Added", "When a bot user was added"),
    entry("bot_changed", "Bot Changed", "When a bot user was changed"),
    entry("block_actions", "Button Interaction", "When a user interacts with buttons, including NPS-style ratings"),
    entry("call_rejected", "Call Rejected", "When a call was rejected"),
    entry("channel_archive", "Channel Archive", "When a channel was archived"),
    entry("channel_created", "Channel Created", "When a new channel was created"),
    entry("channel_deleted", "Channel Deleted", "When a channel was deleted"),
    entry("channel_history_changed", "Channel History Changed", "When bulk updates were made to a channel's history"),
    entry("channel_id_changed", "Channel ID Changed", "When a channel ID changed"),
    entry("channel_joined", "Channel Joined", "When you joined a channel"),
    entry("channel_left", "Channel Left", "When you left a channel"),
    entry("channel_marked", "Channel Marked", "When your channel read marker was updated"),
    entry("channel_rename", "Channel Rename", "When a channel was renamed"),
    entry("channel_shared", "Channel Shared", "When a channel has been shared with an external workspace"),
    entry("channel_unarchive", "Channel Unarchive", "When a channel was unarchived"),
    entry("channel_unshared", "Channel Unshared", "When a channel has been unshared with an external workspace"),
    entry("commands_changed", "Commands Changed", "When a slash command has been added or changed"),
    entry("dnd_updated", "DND Updated", "When Do not Disturb settings changed for the current user"),
    entry("dnd_updated_user", "DND Updated User", "When Do not Disturb settings changed for a member"),
    entry("email_domain_changed", "Email Domain Changed", "When the workspace email domain has changed"),
    entry("emoji_changed", "Emoji Changed", "When a custom emoji has been added or changed"),
    entry("external_org_migration_finished", "External Org Migration Finished", "When an enterprise grid migration has finished on an external workspace"),
    entry("external_org_migration_started", "External Org Migration Started", "When an enterprise grid migration has started on an external workspace"),
    entry("file_change", "File Change", "When a file was changed"),
    entry("file_comment_added", "File Comment Added", "When a file comment was added"),
    entry("file_comment_deleted", "File Comment Deleted", "When a file comment was deleted"),
    entry("file_comment_edited", "File Comment Edited", "When a file comment was edited"),
    entry("file_created", "File Created", "When a file was created"),
    entry("file_deleted", "File Deleted", "When a file was deleted"),
    entry("file_public", "File Public", "When a file was made public"),
    entry("file_shared", "File Shared", "When a file was shared"),
    entry("file_unshared", "File Unshared", "When a file was unshared"),
    entry("function_executed", "Function Executed", "When your app function is executed as a step in a workflow"),
    entry("grid_migration_finished", "Grid Migration Finished", "When an enterprise grid migration has finished on this workspace"),
    entry("grid_migration_started", "Grid Migration Started", "When an enterprise grid migration has started on this workspace"),
    entry("group_archive", "Group Archive", "When a private channel was archived"),
    entry("group_close", "Group Close", "When you closed a private channel"),
    entry("group_deleted", "Group Deleted", "When a private channel was deleted"),
    entry("group_history_changed", "Group History Changed", "When bulk updates were made to a private channel's history"),
    entry("group_joined", "Group Joined", "When you joined a private channel"),
    entry("group_left", "Group Left", "When you left a private channel"),
    entry("group_marked", "Group Marked", "When a private channel read marker was updated"),
    entry("group_open", "Group Open", "When you created a group DM"),
    entry("group_rename", "Group Rename", "When a private channel was renamed"),
    entry("group_unarchive", "Group Unarchive", "When a private channel was unarchived"),
    entry("hello", "Hello", "When the client has successfully connected to the server"),
    entry("im_close", "IM Close", "When you closed a DM"),
    entry("im_created", "IM Created", "When a DM was created"),
    entry("im_history_changed", "IM History Changed", "When bulk updates were made to a DM's history"),
    entry("im_marked", "IM Marked", "When a direct message read marker was updated"),
    entry("im_open", "IM Open", "When you opened a DM"),
    entry("invite_requested", "Invite Requested", "When a user requested an invite"),
    entry("link_shared", "Link Shared", "When a message was posted containing links relevant to your application"),
    entry("manual_presence_change", "Manual Presence Change", "When you manually updated your presence"),
    entry("member_joined_channel", "Member Joined Channel", "When a user joined a public channel, private channel or MPDM"),
    entry("member_left_channel", "Member Left Channel", "When a user left a public or private channel"),
    entry("message", "Message", "When a message was sent to a channel"),
    entry("message.app_home", "Message App Home", "When a user sent a message to your Slack app"),
    entry("message.channels", "Message Channels", "When a message was posted to a channel"),
    entry("message.groups", "Message Groups", "When a message was posted to a private channel"),
    entry("message.im", "Message IM", "When a message was posted in a direct message channel"),
    entry("message_metadata_deleted", "Message Metadata Deleted", "When message metadata was deleted"),
    entry("message_metadata_posted", "Message Metadata Posted", "When message metadata was posted"),
    entry("message_metadata_updated", "Message Metadata Updated", "When message metadata was updated"),
    entry("message.mpim", "Message MPIM", "When a message was posted in a multiparty direct message channel"),
    entry("pin_added", "Pin Added", "When a pin was added to a channel"),
    entry("pin_removed", "Pin Removed", "When a pin was removed from a channel"),
    entry("pref_change", "Pref Change", "When you have updated your preferences"),
    entry("presence_change", "Presence Change", "When a member's presence changed"),
    entry("reaction_added", "Reaction Added", "When a member has added an emoji reaction to an item"),
    entry("reaction_removed", "Reaction Removed", "When a member removed an emoji reaction"),
    entry("resources_added", "Resources Added", "When access to a set of resources was granted for your app"),
    entry("resources_removed", "Resources Removed", "When access to a set of resources was removed for your app"),
    entry("scope_denied", "Scope Denied", "When OAuth scopes were denied to your app"),
    entry("scope_granted", "Scope Granted", "When OAuth scopes were granted to your app"),
    entry("shared_channel_invite_accepted", "Shared Channel Invite Accepted", "When a shared channel invite was accepted"),
    entry("shared_channel_invite_approved", "Shared Channel Invite Approved", "When a shared channel invite was approved"),
    entry("shared_channel_invite_declined", "Shared Channel Invite Declined", "When a shared channel invite was declined"),
    entry("shared_channel_invite_received", "Shared Channel Invite Received", "When a shared channel invite was sent to a Slack user"),
    entry("shared_channel_invite_requested", "Shared Channel Invite Requested", "When a shared channel invite was requested"),
    entry("star_added", "Star Added", "When a member has saved an item for later or starred an item"),
    entry("star_removed", "Star Removed", "When a member has removed an item saved for later or starred an item"),
    entry("subteam_created", "Subteam Created", "When a User Group has been added to the workspace"),
    entry("subteam_members_changed", "Subteam Members Changed", "When the membership of an existing User Group has changed"),
    entry("subteam_self_added", "Subteam Self Added", "When you have been added to a User Group"),
    entry("subteam_self_removed", "Subteam Self Removed", "When you have been removed from a User Group"),
    entry("subteam_updated", "Subteam Updated", "When an existing User Group has been updated or its members changed"),
    entry("team_access_granted", "Team Access Granted", "When access to a set of teams was granted to your org app"),
    entry("team_access_revoked", "Team Access Revoked", "When access to a set of teams was revoked from your org app"),
    entry("team_domain_change", "Team Domain Change", "When the workspace domain has changed"),
    entry("team_join", "Team Join", "When a new member has joined"),
    entry("team_plan_change", "Team Plan Change", "When the account billing plan has changed"),
    entry("team_pref_change", "Team Pref Change", "When a preference has been updated"),
    entry("team_profile_change", "Team Profile Change", "When the workspace profile fields have been updated"),
    entry("team_profile_delete", "Team Profile Delete", "When the workspace profile fields have been deleted"),
    entry("team_profile_reorder", "Team Profile Reorder", "When the workspace profile fields have been reordered"),
    entry("team_rename", "Team Rename", "When the workspace name has changed"),
    entry("tokens_revoked", "Tokens Revoked", "When API tokens for your app were revoked"),
    entry("url_verification", "URL Verification", "When verifying ownership of an Events API Request URL"),
    entry("user_change", "User Change", "When a member's data has changed"),
    entry("user_resource_denied", "User Resource Denied", "When user resource was denied to your app"),
    entry("user_resource_granted", "User Resource Granted", "When user resource was granted to your app"),
    entry("user_resource_removed", "User Resource Removed", "When user resource was removed from your app"),
    entry("user_typing", "User Typing", "When a channel member is typing a message"),
    entry("view_submission", "View Submitted", "When a modal view is submitted (contains submitted values)"),
    entry("view_closed", "View Closed", "When a modal view is closed (contains view details and private_metadata)"),
    entry("workflow_deleted", "Workflow Deleted", "When a workflow that contains a step supported by your app was deleted"),
    entry("workflow_published", "Workflow Published", "When a workflow that contains a step supported by your app was published"),
    entry("workflow_step_deleted", "Workflow Step Deleted", "When a workflow step supported by your app was removed from a workflow"),
    entry("workflow_step_execute", "Workflow Step Execute", "When a workflow step supported by your app should execute"),
    entry("workflow_unpublished", "Workflow Unpublished", "When a workflow that contains a step supported by your app was unpublished"),
];

/// Look up a catalog entry by its wire value.
pub fn find_category(value: &str) -> Option<&'static CategoryInfo> {
    CATEGORY_CATALOG.iter().find(|info| info.value == value)
}
