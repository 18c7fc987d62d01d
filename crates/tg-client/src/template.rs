//! Command templates
//!
//! Templates reference descriptor fields as `{NAME}`, `{ID}`, `{PROTO}`,
//! `{DOMAIN}`, `{PORT}`, `{ADDR}` and `{URL}`. A `\}` in the template stands
//! for a literal `}`. Substituted values are inserted verbatim and never
//! re-scanned.

use tg_protocol::TunnelDescriptor;

/// Expand every placeholder in `template` for tunnel `name`
pub fn render_command(template: &str, name: &str, tunnel: &TunnelDescriptor) -> String {
    let fields: [(&str, &str); 7] = [
        ("{NAME}", name),
        ("{ID}", &tunnel.id),
        ("{PROTO}", &tunnel.proto),
        ("{DOMAIN}", &tunnel.domain),
        ("{PORT}", tunnel.port_str()),
        ("{ADDR}", &tunnel.addr),
        ("{URL}", &tunnel.url),
    ];

    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find(|c| c == '{' || c == '\\') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if let Some(after) = tail.strip_prefix("\\}") {
            out.push('}');
            rest = after;
            continue;
        }

        match fields.iter().find(|(token, _)| tail.starts_with(token)) {
            Some((token, value)) => {
                out.push_str(value);
                rest = &tail[token.len()..];
            }
            None => {
                // '{' and '\' are single-byte
                out.push_str(&tail[..1]);
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}
