//! The ordered catalog of lab steps.
//!
//! Steps are static data: their text, tasks, instructional HTML and the
//! starter files the editor opens with.

/// A file the editor opens when its step is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StarterFile {
    pub name: &'static str,
    pub contents: &'static str,
}

/// One stage of the guided lab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub tasks: &'static [&'static str],
    pub instructions_html: &'static str,
    /// Editor files in tab order; the first one is opened on selection.
    pub starter_files: &'static [StarterFile],
}

impl Step {
    /// The file opened when the step is selected.
    pub fn first_file(&self) -> Option<&StarterFile> {
        self.starter_files.first()
    }

    pub fn starter_file(&self, name: &str) -> Option<&StarterFile> {
        self.starter_files.iter().find(|file| file.name == name)
    }
}

/// Fixed, index-addressable sequence of steps.
#[derive(Debug, Clone, Copy)]
pub struct Catalog {
    steps: &'static [Step],
}

impl Catalog {
    /// The microservice deployment lab.
    pub fn standard() -> Self {
        Self { steps: STEPS }
    }

    /// Builds a catalog over custom steps.
    ///
    /// # Panics
    ///
    /// Panics if `steps` is empty.
    pub fn from_static(steps: &'static [Step]) -> Self {
        assert!(!steps.is_empty(), "a lab needs at least one step");
        Self { steps }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&'static Step> {
        self.steps.get(index)
    }

    /// Index of the step with the given id.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.steps.iter().position(|step| step.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static Step> {
        self.steps.iter()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

/// Starter files shared by every step without a set of its own.
const SKELETON_FILES: &[StarterFile] = &[
    StarterFile {
        name: "app.js",
        contents: r#"// Welcome to the Microservice Lab!
// This is where you'll build your first microservice

console.log('🚀 Starting microservice development...');

// TODO: Initialize Express application
// TODO: Add basic middleware
// TODO: Create your first endpoint"#,
    },
    StarterFile {
        name: "Dockerfile",
        contents: r#"# TODO: Create Dockerfile for your microservice
# Start with a Node.js base image
# Copy your application code
# Install dependencies
# Expose the port
# Define the startup command"#,
    },
    StarterFile {
        name: "docker-compose.yml",
        contents: r#"# TODO: Define your microservice architecture
# Add services for:
# - Your application
# - Database
# - Any other dependencies"#,
    },
];

/// A partly written Express service. Only the containerization step opens
/// with these, so there is a real service to put in a container.
const SERVICE_FILES: &[StarterFile] = &[
    StarterFile {
        name: "app.js",
        contents: r#"const express = require('express');
const app = express();
const PORT = process.env.PORT || 3000;

// Middleware
app.use(express.json());

// TODO: Add health check endpoint
// TODO: Add user management endpoints
// TODO: Add error handling middleware

app.listen(PORT, () => {
  console.log(`🚀 User service running on port ${PORT}`);
});"#,
    },
    StarterFile {
        name: "Dockerfile",
        contents: r#"FROM node:18-alpine

# TODO: Complete the Dockerfile
# Set working directory
# Copy package files
# Install dependencies
# Copy source code
# Expose port
# Start the application"#,
    },
    StarterFile {
        name: "docker-compose.yml",
        contents: r#"version: '3.8'

services:
  user-service:
    build: .
    ports:
      - "3001:3000"
    environment:
      - NODE_ENV=development
    # TODO: Add more configuration"#,
    },
];

const STEPS: &[Step] = &[
    Step {
        id: "setup",
        title: "DevOps Environment Setup",
        description: "Set up your deployment pipeline and infrastructure tools",
        tasks: &[
            "Initialize Git repository",
            "Configure CI/CD pipeline",
            "Set up Docker environment",
            "Install kubectl and helm",
        ],
        instructions_html: r#"<h4>🔧 DevOps Environment Setup</h4>
<p>Set up your complete DevOps toolchain for microservice deployment. This includes version control, containerization, and orchestration tools.</p>
<div class="instruction-block">
  <h5>DevOps Tools to Configure:</h5>
  <ul>
    <li>Git repository initialization and branching strategy</li>
    <li>Docker Engine and Docker Compose setup</li>
    <li>Kubernetes CLI (kubectl) configuration</li>
    <li>Helm package manager installation</li>
    <li>CI/CD pipeline prerequisites</li>
  </ul>
</div>
<div class="code-example">
  <h5>🛠️ Essential Commands:</h5>
  <pre><code># Initialize Git repository
git init
git remote add origin &lt;repository-url&gt;

# Verify Docker installation
docker --version
docker-compose --version

# Check Kubernetes tools
kubectl version --client
helm version

# Set up development environment
export KUBECONFIG=~/.kube/config</code></pre>
</div>"#,
        starter_files: SKELETON_FILES,
    },
    Step {
        id: "containerization",
        title: "Containerization Strategy",
        description: "Build production-ready containers with multi-stage builds",
        tasks: &[
            "Write optimized Dockerfile",
            "Implement security scanning",
            "Create container registry workflow",
            "Set up image versioning",
        ],
        instructions_html: r#"<h4>🐳 Production Containerization Strategy</h4>
<p>Learn advanced Docker techniques for building secure, optimized containers suitable for production deployment.</p>
<div class="instruction-block">
  <h5>Advanced Docker Concepts:</h5>
  <ul>
    <li>Multi-stage builds for optimization</li>
    <li>Security scanning and vulnerability assessment</li>
    <li>Container registry management</li>
    <li>Image versioning and tagging strategies</li>
    <li>Distroless and minimal base images</li>
  </ul>
</div>
<div class="code-example">
  <h5>🔒 Production Dockerfile Example:</h5>
  <pre><code># Multi-stage build
FROM node:18-alpine AS builder
WORKDIR /app
COPY package*.json ./
RUN npm ci --only=production

FROM gcr.io/distroless/nodejs18-debian11
COPY --from=builder /app/node_modules ./node_modules
COPY . .
EXPOSE 3000
USER 1001
CMD ["app.js"]</code></pre>
</div>"#,
        // Deliberately not the skeleton: this step starts from the service files.
        starter_files: SERVICE_FILES,
    },
    Step {
        id: "local-deployment",
        title: "Local Deployment with Docker Compose",
        description: "Deploy multi-service architecture locally",
        tasks: &[
            "Configure service mesh",
            "Set up monitoring stack",
            "Implement service discovery",
            "Configure load balancing",
        ],
        instructions_html: r#"<h4>🏗️ Local Multi-Service Deployment</h4>
<p>Deploy a complete microservice architecture locally using Docker Compose with service mesh, monitoring, and load balancing.</p>
<div class="instruction-block">
  <h5>Infrastructure Components:</h5>
  <ul>
    <li>Service mesh with Envoy proxy</li>
    <li>Prometheus + Grafana monitoring stack</li>
    <li>ELK stack for centralized logging</li>
    <li>Redis cluster for caching</li>
    <li>PostgreSQL with replication</li>
  </ul>
</div>
<div class="code-example">
  <h5>🚀 Deploy Complete Stack:</h5>
  <pre><code># Deploy all services
docker-compose up -d

# Scale specific services
docker-compose up --scale user-service=3

# Monitor service health
docker-compose ps
docker-compose logs -f user-service

# Check resource usage
docker stats</code></pre>
</div>"#,
        starter_files: SKELETON_FILES,
    },
    Step {
        id: "kubernetes-deploy",
        title: "Kubernetes Deployment",
        description: "Deploy microservices to Kubernetes cluster",
        tasks: &[
            "Create K8s manifests",
            "Configure ingress",
            "Set up persistent volumes",
            "Implement rolling updates",
        ],
        instructions_html: r#"<h4>☸️ Kubernetes Production Deployment</h4>
<p>Deploy your microservices to a Kubernetes cluster with proper resource management, ingress, and persistent storage.</p>
<div class="instruction-block">
  <h5>Kubernetes Resources:</h5>
  <ul>
    <li>Deployments with rolling update strategy</li>
    <li>Services and ingress controllers</li>
    <li>ConfigMaps and Secrets management</li>
    <li>Persistent Volume Claims</li>
    <li>Horizontal Pod Autoscaler (HPA)</li>
  </ul>
</div>
<div class="code-example">
  <h5>🎯 Kubernetes Deployment Commands:</h5>
  <pre><code># Apply all manifests
kubectl apply -f k8s/

# Check deployment status
kubectl get deployments
kubectl get pods -o wide

# Configure ingress
kubectl apply -f ingress.yaml

# Set up autoscaling
kubectl autoscale deployment user-service --cpu-percent=70 --min=2 --max=10</code></pre>
</div>"#,
        starter_files: SKELETON_FILES,
    },
    Step {
        id: "cicd-pipeline",
        title: "CI/CD Pipeline Implementation",
        description: "Automate build, test, and deployment processes",
        tasks: &[
            "Configure GitHub Actions",
            "Set up automated testing",
            "Implement blue-green deployment",
            "Configure rollback strategy",
        ],
        instructions_html: r#"<h4>🔄 CI/CD Pipeline Implementation</h4>
<p>Build a complete CI/CD pipeline with automated testing, security scanning, and deployment strategies.</p>
<div class="instruction-block">
  <h5>Pipeline Stages:</h5>
  <ul>
    <li>Automated testing (unit, integration, e2e)</li>
    <li>Security vulnerability scanning</li>
    <li>Container image building and scanning</li>
    <li>Blue-green deployment strategy</li>
    <li>Automated rollback on failure</li>
  </ul>
</div>
<div class="code-example">
  <h5>🚀 GitHub Actions Pipeline:</h5>
  <pre><code># Trigger deployment
git push origin main

# Monitor pipeline
gh workflow list
gh run list

# Manual deployment
gh workflow run deploy.yml

# Rollback if needed
kubectl rollout undo deployment/user-service</code></pre>
</div>"#,
        starter_files: SKELETON_FILES,
    },
    Step {
        id: "production-ops",
        title: "Production Operations",
        description: "Monitor, scale, and maintain production deployments",
        tasks: &[
            "Set up Prometheus monitoring",
            "Configure alerting",
            "Implement auto-scaling",
            "Practice incident response",
        ],
        instructions_html: r#"<h4>🎯 Production Operations &amp; SRE</h4>
<p>Master production operations including monitoring, alerting, incident response, and performance optimization.</p>
<div class="instruction-block">
  <h5>Production Operations:</h5>
  <ul>
    <li>Prometheus metrics and alerting rules</li>
    <li>Grafana dashboards and visualization</li>
    <li>Log aggregation and analysis</li>
    <li>Performance monitoring and optimization</li>
    <li>Incident response and post-mortems</li>
  </ul>
</div>
<div class="code-example">
  <h5>📊 Production Monitoring Commands:</h5>
  <pre><code># Check cluster health
kubectl top nodes
kubectl top pods

# View application logs
kubectl logs -f deployment/user-service

# Monitor metrics
curl http://prometheus:9090/metrics

# Scale based on load
kubectl scale deployment user-service --replicas=5</code></pre>
</div>"#,
        starter_files: SKELETON_FILES,
    },
];
