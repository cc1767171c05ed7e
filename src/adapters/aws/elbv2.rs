use crate::adapters::aws::sdk_config::to_chrono;
use crate::core::error::AwsApiError;
use crate::core::types::{Listener, ListenerAction, ListenerRule, LoadBalancer, RuleCondition};
use crate::ports::LoadBalancerDataSource;
use async_trait::async_trait;
use aws_sdk_elasticloadbalancingv2::types::{
    Action, ActionTypeEnum, Listener as SdkListener, LoadBalancer as SdkLoadBalancer,
    Rule as SdkRule, RuleCondition as SdkRuleCondition,
};
use tracing::{debug, warn};

const SERVICE: &str = "ElasticLoadBalancingV2";

pub(crate) struct AwsElbDataSource {
    client: aws_sdk_elasticloadbalancingv2::Client,
}

impl AwsElbDataSource {
    pub(crate) fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_elasticloadbalancingv2::Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl LoadBalancerDataSource for AwsElbDataSource {
    async fn list_load_balancers(&self) -> Result<Vec<LoadBalancer>, AwsApiError> {
        let mut load_balancers = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let output = self
                .client
                .describe_load_balancers()
                .set_marker(marker.take())
                .send()
                .await
                .map_err(|e| {
                    AwsApiError::api_call(SERVICE, "DescribeLoadBalancers", e.into_service_error())
                })?;

            for lb in output.load_balancers() {
                match load_balancer_from_sdk(lb) {
                    Some(converted) => load_balancers.push(converted),
                    None => warn!("Skipping load balancer without ARN: {:?}", lb),
                }
            }

            match output.next_marker() {
                Some(next) => marker = Some(next.to_string()),
                None => break,
            }
        }

        debug!("Listed {} load balancers", load_balancers.len());
        Ok(load_balancers)
    }

    async fn list_listeners(
        &self,
        load_balancer_arn: &str,
    ) -> Result<Vec<Listener>, AwsApiError> {
        let mut listeners = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let output = self
                .client
                .describe_listeners()
                .load_balancer_arn(load_balancer_arn)
                .set_marker(marker.take())
                .send()
                .await
                .map_err(|e| {
                    AwsApiError::api_call(SERVICE, "DescribeListeners", e.into_service_error())
                })?;

            listeners.extend(output.listeners().iter().filter_map(listener_from_sdk));

            match output.next_marker() {
                Some(next) => marker = Some(next.to_string()),
                None => break,
            }
        }

        debug!(
            "Listed {} listeners for {}",
            listeners.len(),
            load_balancer_arn
        );
        Ok(listeners)
    }

    async fn list_rules(&self, listener_arn: &str) -> Result<Vec<ListenerRule>, AwsApiError> {
        let mut rules = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let output = self
                .client
                .describe_rules()
                .listener_arn(listener_arn)
                .set_marker(marker.take())
                .send()
                .await
                .map_err(|e| {
                    AwsApiError::api_call(SERVICE, "DescribeRules", e.into_service_error())
                })?;

            rules.extend(output.rules().iter().filter_map(rule_from_sdk));

            match output.next_marker() {
                Some(next) => marker = Some(next.to_string()),
                None => break,
            }
        }

        debug!("Listed {} rules for {}", rules.len(), listener_arn);
        Ok(rules)
    }
}

fn load_balancer_from_sdk(lb: &SdkLoadBalancer) -> Option<LoadBalancer> {
    let arn = lb.load_balancer_arn()?;
    Some(LoadBalancer {
        arn: arn.to_string(),
        name: lb.load_balancer_name().unwrap_or_default().to_string(),
        lb_type: lb
            .r#type()
            .map(|t| t.as_str().to_string())
            .unwrap_or_default(),
        dns_name: lb.dns_name().unwrap_or_default().to_string(),
        state: lb
            .state()
            .and_then(|s| s.code())
            .map(|c| c.as_str().to_string())
            .unwrap_or_default(),
        created_at: lb.created_time().and_then(to_chrono),
    })
}

fn listener_from_sdk(listener: &SdkListener) -> Option<Listener> {
    Some(Listener {
        arn: listener.listener_arn()?.to_string(),
        protocol: listener
            .protocol()
            .map(|p| p.as_str().to_string())
            .unwrap_or_default(),
        port: listener.port(),
        default_actions: sorted_actions(listener.default_actions()),
    })
}

fn rule_from_sdk(rule: &SdkRule) -> Option<ListenerRule> {
    Some(ListenerRule {
        arn: rule.rule_arn()?.to_string(),
        priority: rule
            .priority()
            .filter(|p| *p != "default")
            .map(String::from),
        conditions: rule.conditions().iter().map(condition_from_sdk).collect(),
        actions: sorted_actions(rule.actions()),
    })
}

fn condition_from_sdk(condition: &SdkRuleCondition) -> RuleCondition {
    let values = if let Some(cfg) = condition
        .path_pattern_config()
        .filter(|c| !c.values().is_empty())
    {
        cfg.values().to_vec()
    } else if let Some(cfg) = condition
        .host_header_config()
        .filter(|c| !c.values().is_empty())
    {
        cfg.values().to_vec()
    } else {
        condition.values().to_vec()
    };
    RuleCondition {
        field: condition.field().unwrap_or("-").to_string(),
        values,
    }
}

/// Actions run in `Order`; the first one is the one worth summarising.
fn sorted_actions(actions: &[Action]) -> Vec<ListenerAction> {
    let mut ordered: Vec<&Action> = actions.iter().collect();
    ordered.sort_by_key(|a| a.order().unwrap_or(i32::MAX));
    ordered.into_iter().map(action_from_sdk).collect()
}

fn action_from_sdk(action: &Action) -> ListenerAction {
    match action.r#type() {
        Some(ActionTypeEnum::Forward) => {
            let mut target_group_arns: Vec<String> = action
                .forward_config()
                .map(|cfg| {
                    cfg.target_groups()
                        .iter()
                        .filter_map(|tg| tg.target_group_arn().map(String::from))
                        .collect()
                })
                .unwrap_or_default();
            if target_group_arns.is_empty() {
                target_group_arns.extend(action.target_group_arn().map(String::from));
            }
            ListenerAction::Forward { target_group_arns }
        }
        Some(ActionTypeEnum::Redirect) => ListenerAction::Redirect {
            protocol: action
                .redirect_config()
                .and_then(|cfg| cfg.protocol())
                .map(String::from),
            port: action
                .redirect_config()
                .and_then(|cfg| cfg.port())
                .map(String::from),
        },
        Some(ActionTypeEnum::FixedResponse) => ListenerAction::FixedResponse {
            status_code: action
                .fixed_response_config()
                .and_then(|cfg| cfg.status_code())
                .map(String::from),
        },
        Some(other) => ListenerAction::Other(other.as_str().to_string()),
        None => ListenerAction::Other("unknown".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_elasticloadbalancingv2::types::{
        FixedResponseActionConfig, ForwardActionConfig, TargetGroupTuple,
    };

    #[test]
    fn test_forward_action_prefers_forward_config() {
        let action = Action::builder()
            .r#type(ActionTypeEnum::Forward)
            .forward_config(
                ForwardActionConfig::builder()
                    .target_groups(
                        TargetGroupTuple::builder()
                            .target_group_arn(
                                "arn:aws:elasticloadbalancing:r:1:targetgroup/web/1a2b",
                            )
                            .build(),
                    )
                    .build(),
            )
            .build();

        assert_eq!(action_from_sdk(&action).summary(), "Forward → 1a2b");
    }

    #[test]
    fn test_fixed_response_and_untyped_actions() {
        let fixed = Action::builder()
            .r#type(ActionTypeEnum::FixedResponse)
            .fixed_response_config(
                FixedResponseActionConfig::builder()
                    .status_code("404")
                    .build(),
            )
            .build();
        assert_eq!(
            action_from_sdk(&fixed),
            ListenerAction::FixedResponse {
                status_code: Some("404".to_string())
            }
        );

        let untyped = Action::builder().build();
        assert_eq!(
            action_from_sdk(&untyped),
            ListenerAction::Other("unknown".to_string())
        );
    }

    #[test]
    fn test_default_rule_has_no_priority() {
        let rule = SdkRule::builder()
            .rule_arn("arn:rule")
            .priority("default")
            .is_default(true)
            .build();

        let converted = rule_from_sdk(&rule).unwrap();
        assert_eq!(converted.priority_label(), "default");
        assert!(converted.priority.is_none());
    }

    #[test]
    fn test_condition_prefers_path_pattern_values() {
        let condition = SdkRuleCondition::builder()
            .field("path-pattern")
            .path_pattern_config(
                aws_sdk_elasticloadbalancingv2::types::PathPatternConditionConfig::builder()
                    .values("/api/*")
                    .build(),
            )
            .build();

        let converted = condition_from_sdk(&condition);
        assert_eq!(converted.field, "path-pattern");
        assert_eq!(converted.values, vec!["/api/*"]);
    }
}
