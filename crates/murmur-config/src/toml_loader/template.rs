//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> String {
    r##"# murmur configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[server]
# bind = "0.0.0.0"
# port = 8080               # 1-65535
# hello_timeout_secs = 10   # 1-120

[engine]
# delivery_timeout_ms = 5000  # 100-60000; a timed-out delivery ends the chat
# event_capacity = 256        # 16-65536
# channel_capacity = 256      # 16-65536

[tiers]
# Users matched ahead of everyone else.
# priority_users = ["123456789"]

[persistence]
# enabled = false
# snapshot_path = "/var/lib/murmur/snapshot.json"

[logging]
# level = "info"            # trace, debug, info, warn, error
"##
    .to_string()
}
