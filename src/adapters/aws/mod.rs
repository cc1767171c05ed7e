pub(crate) mod ecr;
pub(crate) mod elbv2;
pub(crate) mod route53;
pub(crate) mod sdk_config;
