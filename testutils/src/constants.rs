pub const TEST_NAMESPACE: &str = "test-namespace";
pub const TEST_POD: &str = "the-pod";
pub const TEST_REPLICASET: &str = "the-deployment-5d8f7b9c4";
pub const TEST_DEPLOYMENT: &str = "the-deployment";
pub const TEST_STATEFULSET: &str = "the-statefulset";
pub const TEST_JOB: &str = "the-job";
pub const TEST_CONFIGMAP: &str = "the-configmap";
pub const TEST_CONTAINER: &str = "app";
pub const TEST_SIDECAR: &str = "sidecar";
pub const TEST_INIT_CONTAINER: &str = "init-db";
pub const TEST_IMAGE: &str = "registry.example.com/app:1.2.3";
