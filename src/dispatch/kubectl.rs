//! Simulated `kubectl`.

const RESPONSES: &[(&str, &str)] = &[
    (
        "kubectl get pods",
        "NAME                            READY   STATUS    RESTARTS   AGE
user-service-7d4b8c8f9d-abc12   1/1     Running   0          2m
user-service-7d4b8c8f9d-def34   1/1     Running   0          2m
postgres-6b8f9c7d5e-ghi56      1/1     Running   0          5m
redis-5a7e8d6c4b-jkl78         1/1     Running   0          5m",
    ),
    (
        "kubectl get services",
        "NAME           TYPE        CLUSTER-IP      EXTERNAL-IP   PORT(S)    AGE
user-service   ClusterIP   10.96.123.45    <none>        3000/TCP   5m
postgres       ClusterIP   10.96.234.56    <none>        5432/TCP   5m
redis          ClusterIP   10.96.345.67    <none>        6379/TCP   5m",
    ),
    (
        "kubectl get deployments",
        "NAME           READY   UP-TO-DATE   AVAILABLE   AGE
user-service   2/2     2            2           5m
postgres       1/1     1            1           5m
redis          1/1     1            1           5m",
    ),
];

/// Canned output for a `kubectl` line.
pub fn respond(line: &str) -> String {
    super::lookup(RESPONSES, line)
}
