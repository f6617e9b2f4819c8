//! The built-in training architecture and the instance templates added by
//! scale-out and spot launches.

#[cfg(test)]
#[path = "preset_test.rs"]
mod preset_test;

use serde_json::json;

use crate::registry::Entity;

pub const S3_DATALAKE: &str = "S3_DATALAKE";
pub const SAGEMAKER_TRAINING: &str = "SAGEMAKER_TRAINING";
pub const EC2_TRAINING_NODES: &str = "EC2_TRAINING_NODES";
pub const BEDROCK_MODELS: &str = "BEDROCK_MODELS";
pub const LAMBDA_PREPROCESSING: &str = "LAMBDA_PREPROCESSING";
pub const ECS_SERVING: &str = "ECS_SERVING";
pub const CLOUDWATCH_MONITORING: &str = "CLOUDWATCH_MONITORING";

/// Id prefix for instances added by scale-out.
pub const SCALE_PREFIX: &str = "EC2_SCALE_";

/// Id prefix for spot instances.
pub const SPOT_PREFIX: &str = "SPOT_";

/// The seven core services, laid out around the center of a
/// `width` x `height` viewport (CSS pixels).
#[must_use]
pub fn default_architecture(width: f64, height: f64) -> Vec<Entity> {
    let cx = width / 2.0;
    let cy = height / 2.0;

    vec![
        Entity::new(S3_DATALAKE, "S3 Data Lake", cx, cy - 200.0, 65.0).with_props(json!({
            "color": "#ff6b35",
            "service": "S3",
            "instance_type": "Storage",
            "utilization": 45,
            "throughput": "2.1 GB/s",
            "latency_ms": 12,
            "sla_target": 99.9,
            "cost_per_hour": 150,
            "reliability": 99.8,
            "is_spot": false,
            "availability_zone": "us-east-1a",
        })),
        Entity::new(SAGEMAKER_TRAINING, "SageMaker Training", cx - 300.0, cy, 75.0).with_props(json!({
            "color": "#00d4aa",
            "service": "SageMaker",
            "instance_type": "ml.p4d.24xlarge",
            "utilization": 85,
            "throughput": "1.2k tokens/sec",
            "latency_ms": 45,
            "sla_target": 99.5,
            "cost_per_hour": 458,
            "reliability": 99.1,
            "is_spot": false,
            "availability_zone": "us-east-1a",
        })),
        Entity::new(EC2_TRAINING_NODES, "EC2 Training Cluster", cx + 300.0, cy, 70.0).with_props(json!({
            "color": "#ff9500",
            "service": "EC2",
            "instance_type": "p4d.24xlarge",
            "utilization": 92,
            "throughput": "980 tokens/sec",
            "latency_ms": 38,
            "sla_target": 99.0,
            "cost_per_hour": 434,
            "reliability": 98.7,
            "is_spot": true,
            "availability_zone": "us-east-1b",
        })),
        Entity::new(BEDROCK_MODELS, "Bedrock Foundation", cx, cy + 250.0, 60.0).with_props(json!({
            "color": "#9966cc",
            "service": "Bedrock",
            "instance_type": "Managed Service",
            "utilization": 35,
            "throughput": "500 tokens/sec",
            "latency_ms": 120,
            "sla_target": 99.9,
            "cost_per_hour": 125,
            "reliability": 99.5,
            "is_spot": false,
            "availability_zone": "us-east-1c",
        })),
        Entity::new(LAMBDA_PREPROCESSING, "Lambda Data Pipeline", cx - 150.0, cy - 300.0, 45.0).with_props(json!({
            "color": "#ffa502",
            "service": "Lambda",
            "instance_type": "15GB Memory",
            "utilization": 65,
            "throughput": "2.5k requests/sec",
            "latency_ms": 25,
            "sla_target": 99.95,
            "cost_per_hour": 45,
            "reliability": 99.6,
            "is_spot": false,
            "availability_zone": "Multi-AZ",
        })),
        Entity::new(ECS_SERVING, "ECS Model Serving", cx + 150.0, cy + 150.0, 50.0).with_props(json!({
            "color": "#0080ff",
            "service": "ECS",
            "instance_type": "c5.4xlarge",
            "utilization": 58,
            "throughput": "850 requests/sec",
            "latency_ms": 15,
            "sla_target": 99.5,
            "cost_per_hour": 95,
            "reliability": 99.3,
            "is_spot": false,
            "availability_zone": "us-east-1a",
        })),
        Entity::new(CLOUDWATCH_MONITORING, "CloudWatch Monitor", cx - 200.0, cy + 200.0, 40.0).with_props(json!({
            "color": "#ff6b6b",
            "service": "CloudWatch",
            "instance_type": "Managed Service",
            "utilization": 25,
            "throughput": "10k metrics/sec",
            "latency_ms": 8,
            "sla_target": 99.9,
            "cost_per_hour": 25,
            "reliability": 99.7,
            "is_spot": false,
            "availability_zone": "Multi-AZ",
        })),
    ]
}

/// An on-demand training instance added by scale-out.
#[must_use]
pub fn scale_instance(seq: u64, x: f64, y: f64) -> Entity {
    Entity::new(format!("{SCALE_PREFIX}{seq}"), "EC2 Scale Instance", x, y, 45.0).with_props(json!({
        "color": "#ff9500",
        "service": "EC2",
        "instance_type": "p4d.24xlarge",
        "utilization": 45,
        "throughput": "750 tokens/sec",
        "latency_ms": 42,
        "sla_target": 99.0,
        "cost_per_hour": 434,
        "reliability": 98.5,
        "is_spot": true,
        "availability_zone": "us-east-1c",
    }))
}

/// A discounted spot instance.
#[must_use]
pub fn spot_instance(seq: u64, x: f64, y: f64) -> Entity {
    Entity::new(format!("{SPOT_PREFIX}{seq}"), "Spot Instance", x, y, 40.0).with_props(json!({
        "color": "#ffa502",
        "service": "EC2",
        "instance_type": "p3.8xlarge",
        "utilization": 65,
        "throughput": "420 tokens/sec",
        "latency_ms": 35,
        "sla_target": 95.0,
        "cost_per_hour": 89,
        "reliability": 96.5,
        "is_spot": true,
        "availability_zone": "us-east-1d",
    }))
}

/// Hourly price of a training instance type. Unknown types get a flat
/// on-demand estimate.
#[must_use]
pub fn instance_cost(instance_type: &str) -> f64 {
    match instance_type {
        "p4d.24xlarge" => 434.0,
        "p3dn.24xlarge" => 318.0,
        "trn1.32xlarge" => 245.0,
        "inf2.48xlarge" => 156.0,
        _ => 400.0,
    }
}
