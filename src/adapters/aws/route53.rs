use crate::core::error::AwsApiError;
use crate::core::types::{
    AliasTarget, CidrRouting, DnsRecord, GeoLocation, HostedZone, RoutingPolicy,
};
use crate::ports::DnsDataSource;
use async_trait::async_trait;
use aws_sdk_route53::types::{
    AliasTarget as SdkAliasTarget, Change, ChangeAction, ChangeBatch, CidrRoutingConfig,
    GeoLocation as SdkGeoLocation, ResourceRecord, ResourceRecordSet, ResourceRecordSetFailover,
    ResourceRecordSetRegion, RrType,
};
use tracing::{debug, error, info};

const SERVICE: &str = "Route53";

pub(crate) struct AwsRoute53DataSource {
    client: aws_sdk_route53::Client,
}

impl AwsRoute53DataSource {
    pub(crate) fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_route53::Client::new(sdk_config),
        }
    }

    async fn change_record(
        &self,
        zone_id: &str,
        action: ChangeAction,
        record: &DnsRecord,
    ) -> Result<(), AwsApiError> {
        let record_set = to_sdk_record_set(record)?;
        let change = Change::builder()
            .action(action.clone())
            .resource_record_set(record_set)
            .build()
            .map_err(|e| AwsApiError::InvalidRequest(e.to_string()))?;
        let batch = ChangeBatch::builder()
            .changes(change)
            .build()
            .map_err(|e| AwsApiError::InvalidRequest(e.to_string()))?;

        match self
            .client
            .change_resource_record_sets()
            .hosted_zone_id(zone_id)
            .change_batch(batch)
            .send()
            .await
        {
            Ok(_) => {
                info!(
                    "{} {} ({}) in zone {} submitted",
                    action.as_str(),
                    record.name,
                    record.record_type,
                    zone_id
                );
                Ok(())
            }
            Err(e) => {
                let service_error = e.into_service_error();
                error!(
                    "Failed to {} record {} in zone {}: {}",
                    action.as_str(),
                    record.name,
                    zone_id,
                    service_error
                );
                Err(AwsApiError::api_call(
                    SERVICE,
                    "ChangeResourceRecordSets",
                    service_error,
                ))
            }
        }
    }
}

#[async_trait]
impl DnsDataSource for AwsRoute53DataSource {
    async fn list_hosted_zones(&self) -> Result<Vec<HostedZone>, AwsApiError> {
        let mut zones = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let output = self
                .client
                .list_hosted_zones()
                .set_marker(marker.take())
                .send()
                .await
                .map_err(|e| {
                    AwsApiError::api_call(SERVICE, "ListHostedZones", e.into_service_error())
                })?;

            zones.extend(output.hosted_zones().iter().map(|zone| HostedZone {
                id: zone.id().to_string(),
                name: zone.name().to_string(),
                record_count: zone.resource_record_set_count().unwrap_or_default(),
                private_zone: zone.config().is_some_and(|c| c.private_zone()),
            }));

            match output.next_marker() {
                Some(next) if output.is_truncated() => marker = Some(next.to_string()),
                _ => break,
            }
        }

        debug!("Listed {} hosted zones", zones.len());
        Ok(zones)
    }

    async fn list_records(&self, zone_id: &str) -> Result<Vec<DnsRecord>, AwsApiError> {
        let mut records = Vec::new();
        let mut start_name: Option<String> = None;
        let mut start_type: Option<RrType> = None;
        let mut start_identifier: Option<String> = None;

        loop {
            let output = self
                .client
                .list_resource_record_sets()
                .hosted_zone_id(zone_id)
                .set_start_record_name(start_name.take())
                .set_start_record_type(start_type.take())
                .set_start_record_identifier(start_identifier.take())
                .send()
                .await
                .map_err(|e| {
                    AwsApiError::api_call(SERVICE, "ListResourceRecordSets", e.into_service_error())
                })?;

            records.extend(output.resource_record_sets().iter().map(record_from_sdk));

            if !output.is_truncated() {
                break;
            }
            start_name = output.next_record_name().map(String::from);
            start_type = output.next_record_type().cloned();
            start_identifier = output.next_record_identifier().map(String::from);
            if start_name.is_none() {
                break;
            }
        }

        debug!("Listed {} records for zone {}", records.len(), zone_id);
        Ok(records)
    }

    async fn upsert_record(&self, zone_id: &str, record: &DnsRecord) -> Result<(), AwsApiError> {
        self.change_record(zone_id, ChangeAction::Upsert, record)
            .await
    }

    async fn delete_record(&self, zone_id: &str, record: &DnsRecord) -> Result<(), AwsApiError> {
        self.change_record(zone_id, ChangeAction::Delete, record)
            .await
    }
}

pub(crate) fn record_from_sdk(set: &ResourceRecordSet) -> DnsRecord {
    DnsRecord {
        name: set.name().to_string(),
        record_type: set.r#type().as_str().to_string(),
        ttl: set.ttl(),
        values: set
            .resource_records()
            .iter()
            .map(|r| r.value().to_string())
            .collect(),
        alias: set.alias_target().map(|alias| AliasTarget {
            hosted_zone_id: alias.hosted_zone_id().to_string(),
            dns_name: alias.dns_name().to_string(),
            evaluate_target_health: alias.evaluate_target_health(),
        }),
        routing: RoutingPolicy {
            set_identifier: set.set_identifier().map(String::from),
            weight: set.weight(),
            region: set.region().map(|r| r.as_str().to_string()),
            failover: set.failover().map(|f| f.as_str().to_string()),
            multi_value_answer: set.multi_value_answer(),
            health_check_id: set.health_check_id().map(String::from),
            geo_location: set.geo_location().map(|geo| GeoLocation {
                continent_code: geo.continent_code().map(String::from),
                country_code: geo.country_code().map(String::from),
                subdivision_code: geo.subdivision_code().map(String::from),
            }),
            cidr_routing: set.cidr_routing_config().map(|cidr| CidrRouting {
                collection_id: cidr.collection_id().to_string(),
                location_name: cidr.location_name().to_string(),
            }),
            traffic_policy_instance_id: set.traffic_policy_instance_id().map(String::from),
        },
    }
}

pub(crate) fn to_sdk_record_set(record: &DnsRecord) -> Result<ResourceRecordSet, AwsApiError> {
    let resource_records = if record.values.is_empty() {
        None
    } else {
        Some(
            record
                .values
                .iter()
                .map(|value| {
                    ResourceRecord::builder()
                        .value(value)
                        .build()
                        .map_err(|e| AwsApiError::InvalidRequest(e.to_string()))
                })
                .collect::<Result<Vec<_>, _>>()?,
        )
    };

    let alias_target = record
        .alias
        .as_ref()
        .map(|alias| {
            SdkAliasTarget::builder()
                .hosted_zone_id(&alias.hosted_zone_id)
                .dns_name(&alias.dns_name)
                .evaluate_target_health(alias.evaluate_target_health)
                .build()
                .map_err(|e| AwsApiError::InvalidRequest(e.to_string()))
        })
        .transpose()?;

    let routing = &record.routing;
    let geo_location = routing.geo_location.as_ref().map(|geo| {
        SdkGeoLocation::builder()
            .set_continent_code(geo.continent_code.clone())
            .set_country_code(geo.country_code.clone())
            .set_subdivision_code(geo.subdivision_code.clone())
            .build()
    });
    let cidr_routing = routing
        .cidr_routing
        .as_ref()
        .map(|cidr| {
            CidrRoutingConfig::builder()
                .collection_id(&cidr.collection_id)
                .location_name(&cidr.location_name)
                .build()
                .map_err(|e| AwsApiError::InvalidRequest(e.to_string()))
        })
        .transpose()?;

    ResourceRecordSet::builder()
        .name(&record.name)
        .r#type(RrType::from(record.record_type.as_str()))
        .set_ttl(record.ttl)
        .set_resource_records(resource_records)
        .set_alias_target(alias_target)
        .set_set_identifier(routing.set_identifier.clone())
        .set_weight(routing.weight)
        .set_region(routing.region.as_deref().map(ResourceRecordSetRegion::from))
        .set_failover(routing.failover.as_deref().map(ResourceRecordSetFailover::from))
        .set_multi_value_answer(routing.multi_value_answer)
        .set_health_check_id(routing.health_check_id.clone())
        .set_geo_location(geo_location)
        .set_cidr_routing_config(cidr_routing)
        .set_traffic_policy_instance_id(routing.traffic_policy_instance_id.clone())
        .build()
        .map_err(|e| AwsApiError::InvalidRequest(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weighted_record() -> DnsRecord {
        DnsRecord {
            name: "www.a.com.".to_string(),
            record_type: "A".to_string(),
            ttl: Some(300),
            values: vec!["10.0.0.1".to_string(), "10.0.0.2".to_string()],
            alias: None,
            routing: RoutingPolicy {
                set_identifier: Some("blue".to_string()),
                weight: Some(20),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_record_survives_sdk_conversion() {
        let record = weighted_record();
        let sdk = to_sdk_record_set(&record).unwrap();
        assert_eq!(sdk.r#type(), &RrType::A);
        assert_eq!(sdk.resource_records().len(), 2);
        assert_eq!(record_from_sdk(&sdk), record);
    }

    #[test]
    fn test_alias_record_conversion_omits_values() {
        let mut record = weighted_record();
        record.values.clear();
        record.ttl = None;
        record.alias = Some(AliasTarget {
            hosted_zone_id: "Z215JYRZR1TBD5".to_string(),
            dns_name: "my-lb-123.eu-central-1.elb.amazonaws.com.".to_string(),
            evaluate_target_health: true,
        });

        let sdk = to_sdk_record_set(&record).unwrap();
        assert!(sdk.resource_records().is_empty());
        assert_eq!(
            sdk.alias_target().map(|a| a.hosted_zone_id()),
            Some("Z215JYRZR1TBD5")
        );
        assert_eq!(sdk.ttl(), None);
    }

    #[test]
    fn test_geolocation_record_keeps_routing_key() {
        let mut record = weighted_record();
        record.routing = RoutingPolicy {
            set_identifier: Some("germany".to_string()),
            geo_location: Some(GeoLocation {
                country_code: Some("DE".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let sdk = to_sdk_record_set(&record).unwrap();
        assert_eq!(
            sdk.geo_location().and_then(|geo| geo.country_code()),
            Some("DE")
        );
        assert_eq!(sdk.weight(), None);
        assert_eq!(record_from_sdk(&sdk), record);
    }

    #[test]
    fn test_cidr_routing_record_keeps_location() {
        let mut record = weighted_record();
        record.routing = RoutingPolicy {
            set_identifier: Some("office".to_string()),
            cidr_routing: Some(CidrRouting {
                collection_id: "c-1234".to_string(),
                location_name: "berlin".to_string(),
            }),
            traffic_policy_instance_id: Some("tp-1".to_string()),
            ..Default::default()
        };

        let sdk = to_sdk_record_set(&record).unwrap();
        assert_eq!(
            sdk.cidr_routing_config().map(|cidr| cidr.location_name()),
            Some("berlin")
        );
        assert_eq!(record_from_sdk(&sdk), record);
    }
}
