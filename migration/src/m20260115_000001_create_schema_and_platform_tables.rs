use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared("CREATE SCHEMA IF NOT EXISTS meetbot")
            .await?;

        db.execute_unprepared(
            r#"
            CREATE TABLE IF NOT EXISTS meetbot.organizations (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                name VARCHAR(255) NOT NULL UNIQUE,
                centicredits INTEGER NOT NULL DEFAULT 0,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#,
        )
        .await?;

        db.execute_unprepared(
            r#"
            CREATE TABLE IF NOT EXISTS meetbot.projects (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                object_id VARCHAR(32) NOT NULL UNIQUE,
                organization_id UUID NOT NULL
                    REFERENCES meetbot.organizations(id),
                name VARCHAR(255) NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#,
        )
        .await?;

        db.execute_unprepared(
            r#"
            CREATE TABLE IF NOT EXISTS meetbot.bots (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                object_id VARCHAR(32) NOT NULL UNIQUE,
                project_id UUID NOT NULL
                    REFERENCES meetbot.projects(id),
                name VARCHAR(255) NOT NULL DEFAULT 'My bot',
                meeting_url VARCHAR(511) NOT NULL,
                state INTEGER NOT NULL DEFAULT 1,
                settings JSONB NOT NULL DEFAULT '{}',
                metadata JSONB,
                first_heartbeat_timestamp BIGINT,
                last_heartbeat_timestamp BIGINT,
                join_at TIMESTAMPTZ,
                deduplication_key VARCHAR(1024),
                session_kind INTEGER NOT NULL DEFAULT 1,
                version INTEGER NOT NULL DEFAULT 0,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#,
        )
        .await?;

        // Scheduled bots are polled by join_at; bots without one stay out of
        // the index.
        db.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS bot_join_at_idx \
             ON meetbot.bots (join_at) WHERE join_at IS NOT NULL",
        )
        .await?;

        // Within a project, at most one bot per deduplication key may be
        // outside the post-meeting states (7 fatal_error, 9 ended,
        // 10 data_deleted).
        db.execute_unprepared(
            "CREATE UNIQUE INDEX IF NOT EXISTS unique_bot_deduplication_key \
             ON meetbot.bots (project_id, deduplication_key) \
             WHERE deduplication_key IS NOT NULL AND state NOT IN (7, 9, 10)",
        )
        .await?;

        db.execute_unprepared(
            r#"
            CREATE TABLE IF NOT EXISTS meetbot.bot_events (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                bot_id UUID NOT NULL
                    REFERENCES meetbot.bots(id) ON DELETE CASCADE,
                old_state INTEGER NOT NULL,
                new_state INTEGER NOT NULL,
                event_kind INTEGER NOT NULL,
                event_subkind INTEGER,
                metadata JSONB NOT NULL DEFAULT '{}',
                requested_action_taken_at TIMESTAMPTZ,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#,
        )
        .await?;

        db.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS bot_events_bot_id_created_at_idx \
             ON meetbot.bot_events (bot_id, created_at)",
        )
        .await?;

        // The §4.1 combination rule: subkind-carrying kinds (7 fatal_error,
        // 9 could_not_join, 8 leave_requested, 19 recording_permission_denied)
        // require a subkind from their permitted set; leave_requested also
        // accepts null for backwards compatibility; everything else requires
        // a null subkind.
        db.execute_unprepared(
            r#"
            ALTER TABLE meetbot.bot_events
            ADD CONSTRAINT valid_event_kind_event_subkind_combinations CHECK (
                (event_kind = 7 AND event_subkind IN (2, 6, 8, 13, 15, 20, 22))
                OR (event_kind = 9 AND event_subkind IN (1, 3, 4, 5, 7, 9, 14, 16, 18, 19, 21, 27))
                OR (event_kind = 8 AND (event_subkind IN (10, 11, 12, 17, 26) OR event_subkind IS NULL))
                OR (event_kind = 19 AND event_subkind IN (23, 24, 25))
                OR (event_kind NOT IN (7, 8, 9, 19) AND event_subkind IS NULL)
            )
        "#,
        )
        .await?;

        db.execute_unprepared(
            r#"
            CREATE TABLE IF NOT EXISTS meetbot.recordings (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                object_id VARCHAR(32) NOT NULL UNIQUE,
                bot_id UUID NOT NULL
                    REFERENCES meetbot.bots(id) ON DELETE CASCADE,
                recording_kind INTEGER NOT NULL,
                transcription_kind INTEGER NOT NULL,
                is_default_recording BOOLEAN NOT NULL DEFAULT FALSE,
                state INTEGER NOT NULL DEFAULT 1,
                transcription_state INTEGER NOT NULL DEFAULT 1,
                transcription_failure_data JSONB,
                transcription_provider INTEGER,
                file_name VARCHAR(1024),
                started_at TIMESTAMPTZ,
                completed_at TIMESTAMPTZ,
                version INTEGER NOT NULL DEFAULT 0,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#,
        )
        .await?;

        db.execute_unprepared(
            r#"
            CREATE TABLE IF NOT EXISTS meetbot.participants (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                object_id VARCHAR(32) NOT NULL UNIQUE,
                bot_id UUID NOT NULL
                    REFERENCES meetbot.bots(id) ON DELETE CASCADE,
                uuid VARCHAR(255) NOT NULL,
                full_name VARCHAR(255),
                is_the_bot BOOLEAN NOT NULL DEFAULT FALSE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#,
        )
        .await?;

        db.execute_unprepared(
            r#"
            CREATE TABLE IF NOT EXISTS meetbot.async_transcriptions (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                object_id VARCHAR(32) NOT NULL UNIQUE,
                recording_id UUID NOT NULL
                    REFERENCES meetbot.recordings(id) ON DELETE CASCADE,
                state INTEGER NOT NULL DEFAULT 1,
                settings JSONB NOT NULL DEFAULT '{}',
                failure_data JSONB,
                started_at TIMESTAMPTZ,
                failed_at TIMESTAMPTZ,
                completed_at TIMESTAMPTZ,
                version INTEGER NOT NULL DEFAULT 0,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#,
        )
        .await?;

        db.execute_unprepared(
            r#"
            CREATE TABLE IF NOT EXISTS meetbot.utterances (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                recording_id UUID NOT NULL
                    REFERENCES meetbot.recordings(id) ON DELETE CASCADE,
                async_transcription_id UUID
                    REFERENCES meetbot.async_transcriptions(id) ON DELETE CASCADE,
                participant_id UUID NOT NULL
                    REFERENCES meetbot.participants(id),
                timestamp_ms BIGINT NOT NULL,
                duration_ms INTEGER NOT NULL,
                transcription JSONB,
                transcription_attempt_count INTEGER NOT NULL DEFAULT 0,
                failure_data JSONB,
                source_uuid VARCHAR(255) UNIQUE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#,
        )
        .await?;

        db.execute_unprepared(
            r#"
            CREATE TABLE IF NOT EXISTS meetbot.chat_messages (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                object_id VARCHAR(32) NOT NULL UNIQUE,
                bot_id UUID NOT NULL
                    REFERENCES meetbot.bots(id) ON DELETE CASCADE,
                participant_id UUID NOT NULL
                    REFERENCES meetbot.participants(id) ON DELETE CASCADE,
                text TEXT NOT NULL,
                timestamp BIGINT NOT NULL,
                additional_data JSONB NOT NULL DEFAULT '{}',
                source_uuid VARCHAR(255) UNIQUE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#,
        )
        .await?;

        db.execute_unprepared(
            r#"
            CREATE TABLE IF NOT EXISTS meetbot.credit_transactions (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                organization_id UUID NOT NULL
                    REFERENCES meetbot.organizations(id),
                centicredits_before INTEGER NOT NULL,
                centicredits_after INTEGER NOT NULL,
                centicredits_delta INTEGER NOT NULL,
                parent_transaction_id UUID
                    REFERENCES meetbot.credit_transactions(id),
                bot_id UUID REFERENCES meetbot.bots(id),
                stripe_payment_intent_id VARCHAR(255),
                description TEXT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#,
        )
        .await?;

        // The ledger's linearity: one root per organization, one child per
        // parent, at most one transaction per bot and per payment intent.
        db.execute_unprepared(
            "CREATE UNIQUE INDEX IF NOT EXISTS unique_child_transaction \
             ON meetbot.credit_transactions (parent_transaction_id) \
             WHERE parent_transaction_id IS NOT NULL",
        )
        .await?;
        db.execute_unprepared(
            "CREATE UNIQUE INDEX IF NOT EXISTS unique_root_transaction \
             ON meetbot.credit_transactions (organization_id) \
             WHERE parent_transaction_id IS NULL",
        )
        .await?;
        db.execute_unprepared(
            "CREATE UNIQUE INDEX IF NOT EXISTS unique_bot_transaction \
             ON meetbot.credit_transactions (bot_id) WHERE bot_id IS NOT NULL",
        )
        .await?;
        db.execute_unprepared(
            "CREATE UNIQUE INDEX IF NOT EXISTS unique_stripe_payment_intent_id \
             ON meetbot.credit_transactions (stripe_payment_intent_id) \
             WHERE stripe_payment_intent_id IS NOT NULL",
        )
        .await?;

        db.execute_unprepared(
            r#"
            CREATE TABLE IF NOT EXISTS meetbot.webhook_subscriptions (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                object_id VARCHAR(32) NOT NULL UNIQUE,
                project_id UUID NOT NULL
                    REFERENCES meetbot.projects(id) ON DELETE CASCADE,
                bot_id UUID REFERENCES meetbot.bots(id) ON DELETE CASCADE,
                url VARCHAR(2048) NOT NULL,
                triggers JSONB NOT NULL DEFAULT '[1]',
                is_active BOOLEAN NOT NULL DEFAULT TRUE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#,
        )
        .await?;

        db.execute_unprepared(
            r#"
            CREATE TABLE IF NOT EXISTS meetbot.webhook_delivery_attempts (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                webhook_subscription_id UUID NOT NULL
                    REFERENCES meetbot.webhook_subscriptions(id) ON DELETE CASCADE,
                webhook_trigger INTEGER NOT NULL DEFAULT 1,
                idempotency_key UUID NOT NULL UNIQUE,
                bot_id UUID REFERENCES meetbot.bots(id) ON DELETE SET NULL,
                payload JSONB NOT NULL DEFAULT '{}',
                status INTEGER NOT NULL DEFAULT 1,
                attempt_count INTEGER NOT NULL DEFAULT 0,
                last_attempt_at TIMESTAMPTZ,
                succeeded_at TIMESTAMPTZ,
                response_body_list JSONB NOT NULL DEFAULT '[]',
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#,
        )
        .await?;

        db.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS webhook_delivery_attempts_status_idx \
             ON meetbot.webhook_delivery_attempts (status, created_at)",
        )
        .await?;

        db.execute_unprepared(
            r#"
            CREATE TABLE IF NOT EXISTS meetbot.webhook_secrets (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                project_id UUID NOT NULL
                    REFERENCES meetbot.projects(id) ON DELETE CASCADE,
                encrypted_secret TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#,
        )
        .await?;

        db.execute_unprepared(
            r#"
            CREATE TABLE IF NOT EXISTS meetbot.credentials (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                project_id UUID NOT NULL
                    REFERENCES meetbot.projects(id) ON DELETE CASCADE,
                credential_kind INTEGER NOT NULL,
                encrypted_data TEXT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                CONSTRAINT unique_project_credentials UNIQUE (project_id, credential_kind)
            )
        "#,
        )
        .await?;

        db.execute_unprepared(
            r#"
            CREATE TABLE IF NOT EXISTS meetbot.bot_resource_snapshots (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                bot_id UUID NOT NULL
                    REFERENCES meetbot.bots(id) ON DELETE CASCADE,
                data JSONB NOT NULL DEFAULT '{}',
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#,
        )
        .await?;

        db.execute_unprepared(
            r#"
            CREATE TABLE IF NOT EXISTS meetbot.bot_debug_screenshots (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                object_id VARCHAR(32) NOT NULL UNIQUE,
                bot_event_id UUID NOT NULL
                    REFERENCES meetbot.bot_events(id) ON DELETE CASCADE,
                file_name VARCHAR(1024),
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#,
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP SCHEMA IF EXISTS meetbot CASCADE")
            .await?;
        Ok(())
    }
}
