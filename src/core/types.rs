use chrono::{DateTime, Utc};

pub(crate) const CLOUDFRONT_HOSTED_ZONE_ID: &str = "Z2FDTNDATAQYW2";

const ELB_HOSTED_ZONE_IDS: &[(&str, &str)] = &[
    ("us-east-1", "Z35SXDOTRQ7X7K"),
    ("us-east-2", "Z3AADJGX6KTTL2"),
    ("us-west-1", "Z368ELLRRE2KJ0"),
    ("us-west-2", "Z1H1FL5HABSF5"),
    ("af-south-1", "Z268VQBMOI5EKX"),
    ("ap-east-1", "Z3DQVH9N71FHZ0"),
    ("ap-south-1", "ZP97RAFLXTNZK"),
    ("ap-northeast-3", "Z5LXEXXYW11ES"),
    ("ap-northeast-2", "ZWKZPGTI48KDX"),
    ("ap-southeast-1", "Z1LMS91P8CMLE5"),
    ("ap-southeast-2", "Z1GM3OXH4ZPM65"),
    ("ap-northeast-1", "Z14GRHDCWA56QT"),
    ("ca-central-1", "ZQSVJUPU6J1EY"),
    ("eu-central-1", "Z215JYRZR1TBD5"),
    ("eu-west-1", "Z32O12XQLNTSW2"),
    ("eu-west-2", "ZHURV8PSTC4K8"),
    ("eu-south-1", "Z3ULH7SSC9OV64"),
    ("eu-west-3", "Z3Q77PNBQS71R4"),
    ("eu-north-1", "Z23TAZ6LKFMNIO"),
    ("me-south-1", "ZS929ML54UICD"),
    ("sa-east-1", "Z2P70J7HTTTPLU"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum MessageLevel {
    Info,
    Warning,
    Error,
    Debug,
    Trace,
}

pub(crate) fn trim_dot(name: &str) -> &str {
    name.strip_suffix('.').unwrap_or(name)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct HostedZone {
    pub id: String,
    pub name: String,
    pub record_count: i64,
    pub private_zone: bool,
}

impl HostedZone {
    /// Hosted zone ids come back as `/hostedzone/Z123`; the API accepts the bare id too.
    pub(crate) fn short_id(&self) -> &str {
        self.id.rsplit('/').next().unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AliasTarget {
    pub hosted_zone_id: String,
    pub dns_name: String,
    pub evaluate_target_health: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AliasKind {
    CloudFront,
    LoadBalancer,
    Other,
}

impl AliasTarget {
    pub(crate) fn kind(&self) -> AliasKind {
        if self.hosted_zone_id == CLOUDFRONT_HOSTED_ZONE_ID {
            AliasKind::CloudFront
        } else if ELB_HOSTED_ZONE_IDS
            .iter()
            .any(|(_, zone_id)| *zone_id == self.hosted_zone_id)
        {
            AliasKind::LoadBalancer
        } else {
            AliasKind::Other
        }
    }

    pub(crate) fn label(&self) -> String {
        let prefix = match self.kind() {
            AliasKind::CloudFront => "CloudFront",
            AliasKind::LoadBalancer => "ELB",
            AliasKind::Other => "Alias",
        };
        format!(
            "{} ({}) -> {}",
            prefix,
            self.hosted_zone_id,
            trim_dot(&self.dns_name)
        )
    }

    pub(crate) fn search_text(&self) -> String {
        format!("{} {}", self.hosted_zone_id, self.dns_name)
    }
}

/// Routing-policy attributes that identify one record set among several with
/// the same name and type. They ride along unchanged on every mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct RoutingPolicy {
    pub set_identifier: Option<String>,
    pub weight: Option<i64>,
    pub region: Option<String>,
    pub failover: Option<String>,
    pub multi_value_answer: Option<bool>,
    pub health_check_id: Option<String>,
    pub geo_location: Option<GeoLocation>,
    pub cidr_routing: Option<CidrRouting>,
    pub traffic_policy_instance_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct GeoLocation {
    pub continent_code: Option<String>,
    pub country_code: Option<String>,
    pub subdivision_code: Option<String>,
}

/// IP-based routing: a location inside a CIDR collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CidrRouting {
    pub collection_id: String,
    pub location_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DnsRecord {
    pub name: String,
    pub record_type: String,
    pub ttl: Option<i64>,
    pub values: Vec<String>,
    pub alias: Option<AliasTarget>,
    pub routing: RoutingPolicy,
}

impl DnsRecord {
    pub(crate) fn is_alias(&self) -> bool {
        self.alias.is_some()
    }

    pub(crate) fn display_name(&self) -> &str {
        trim_dot(&self.name)
    }

    pub(crate) fn display_values(&self) -> Vec<String> {
        match &self.alias {
            Some(alias) => vec![alias.label()],
            None => self.values.clone(),
        }
    }
}

/// Full replacement state for a record, as produced by the edit form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RecordChange {
    pub record_type: String,
    pub ttl: i64,
    pub values: Vec<String>,
}

impl RecordChange {
    /// Rebuilds `original` with the form's type, TTL and values. The name and
    /// routing attributes are kept, the alias target is dropped.
    pub(crate) fn apply_to(&self, original: &DnsRecord) -> DnsRecord {
        DnsRecord {
            name: original.name.clone(),
            record_type: self.record_type.clone(),
            ttl: Some(self.ttl),
            values: self.values.clone(),
            alias: None,
            routing: original.routing.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Repository {
    pub name: String,
    pub uri: String,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ContainerImage {
    pub tags: Vec<String>,
    pub digest: String,
    pub pushed_at: Option<DateTime<Utc>>,
    pub size_bytes: Option<i64>,
}

impl ContainerImage {
    pub(crate) fn primary_tag(&self) -> Option<&str> {
        self.tags.first().map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LoadBalancer {
    pub arn: String,
    pub name: String,
    pub lb_type: String,
    pub dns_name: String,
    pub state: String,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ListenerAction {
    Forward { target_group_arns: Vec<String> },
    Redirect {
        protocol: Option<String>,
        port: Option<String>,
    },
    FixedResponse { status_code: Option<String> },
    Other(String),
}

fn target_group_name(arn: &str) -> &str {
    arn.rsplit('/').next().unwrap_or(arn)
}

impl ListenerAction {
    pub(crate) fn type_name(&self) -> &str {
        match self {
            ListenerAction::Forward { .. } => "forward",
            ListenerAction::Redirect { .. } => "redirect",
            ListenerAction::FixedResponse { .. } => "fixed-response",
            ListenerAction::Other(raw) => raw,
        }
    }

    /// Target column text: target group names, redirect destination or status code.
    pub(crate) fn target(&self) -> Option<String> {
        match self {
            ListenerAction::Forward { target_group_arns } if !target_group_arns.is_empty() => {
                Some(
                    target_group_arns
                        .iter()
                        .map(|arn| target_group_name(arn))
                        .collect::<Vec<_>>()
                        .join(", "),
                )
            }
            ListenerAction::Redirect { protocol, port } => Some(format!(
                "{}:{}",
                protocol.as_deref().unwrap_or_default(),
                port.as_deref().unwrap_or_default()
            )),
            ListenerAction::FixedResponse {
                status_code: Some(code),
            } => Some(code.clone()),
            _ => None,
        }
    }

    pub(crate) fn summary(&self) -> String {
        match (self, self.target()) {
            (ListenerAction::Forward { .. }, Some(names)) => format!("Forward → {names}"),
            (ListenerAction::Forward { .. }, None) => "Forward".to_string(),
            (ListenerAction::Redirect { .. }, Some(dest)) => format!("Redirect → {dest}"),
            (ListenerAction::FixedResponse { .. }, Some(code)) => format!("Fixed {code}"),
            _ => self.type_name().to_string(),
        }
    }
}

pub(crate) fn summarize_actions(actions: &[ListenerAction]) -> String {
    actions
        .first()
        .map_or_else(|| "-".to_string(), ListenerAction::summary)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Listener {
    pub arn: String,
    pub protocol: String,
    pub port: Option<i32>,
    pub default_actions: Vec<ListenerAction>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RuleCondition {
    pub field: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ListenerRule {
    pub arn: String,
    pub priority: Option<String>,
    pub conditions: Vec<RuleCondition>,
    pub actions: Vec<ListenerAction>,
}

impl ListenerRule {
    pub(crate) fn priority_label(&self) -> &str {
        self.priority.as_deref().unwrap_or("default")
    }

    pub(crate) fn condition_summary(&self) -> (String, String) {
        match self.conditions.first() {
            None => ("-".to_string(), "-".to_string()),
            Some(cond) if cond.values.is_empty() => (cond.field.clone(), "-".to_string()),
            Some(cond) => (cond.field.clone(), cond.values.join(", ")),
        }
    }

    pub(crate) fn action_summary(&self) -> (String, String) {
        match self.actions.first() {
            None => ("-".to_string(), "-".to_string()),
            Some(action) => (
                action.type_name().to_string(),
                action.target().unwrap_or_else(|| "-".to_string()),
            ),
        }
    }
}
