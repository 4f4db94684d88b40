//! Simulated `helm`.

const RESPONSES: &[(&str, &str)] = &[
    (
        "helm list",
        "NAME            NAMESPACE       REVISION        UPDATED                                 STATUS          CHART                   APP VERSION
microservice    default         1               2024-01-15 10:30:00.123456789 +0000 UTC deployed        microservice-0.1.0     1.0.0",
    ),
    (
        "helm status microservice",
        "NAME: microservice
LAST DEPLOYED: Mon Jan 15 10:30:00 2024
NAMESPACE: default
STATUS: deployed
REVISION: 1",
    ),
];

/// Canned output for a `helm` line.
pub fn respond(line: &str) -> String {
    super::lookup(RESPONSES, line)
}
