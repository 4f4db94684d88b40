//! Simulated `docker` and `docker-compose`.

const RESPONSES: &[(&str, &str)] = &[
    (
        "docker ps",
        r#"CONTAINER ID   IMAGE              COMMAND                  STATUS         PORTS                    NAMES
abc123def456   user-service:v1    "node app.js"            Up 2 minutes   0.0.0.0:3001->3000/tcp   user-service_1
def456ghi789   postgres:15        "docker-entrypoint.s…"   Up 5 minutes   0.0.0.0:5432->5432/tcp   postgres_1
ghi789jkl012   redis:7-alpine     "docker-entrypoint.s…"   Up 5 minutes   0.0.0.0:6379->6379/tcp   redis_1"#,
    ),
    (
        "docker images",
        "REPOSITORY       TAG       IMAGE ID       CREATED         SIZE
user-service     v1        abc123def456   2 minutes ago   145MB
user-service     latest    abc123def456   2 minutes ago   145MB
postgres         15        def456ghi789   2 weeks ago     379MB
redis            7-alpine  ghi789jkl012   3 weeks ago     32.3MB",
    ),
    (
        "docker-compose up -d",
        r#"Creating network "microservice_default" with the default driver
Creating postgres ... done
Creating redis    ... done
Creating user-service ... done
✅ All services started successfully!"#,
    ),
];

/// Canned output for a `docker` line.
pub fn respond(line: &str) -> String {
    super::lookup(RESPONSES, line)
}
